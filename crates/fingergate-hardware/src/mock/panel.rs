//! Mock door panel that reports every lock change and display write.

use crate::{HardwareError, Result, traits::AccessActuator};
use fingergate_core::constants::DISPLAY_LINES;
use tokio::sync::mpsc;

/// Something the pipeline did to the door panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Lock { open: bool },
    Line { line: u8, text: String },
}

/// Mock lock and display.
///
/// Every call is forwarded to the [`MockPanelHandle`] so tests can assert on
/// the exact sequence after the panel has been moved into the pipeline.
#[derive(Debug)]
pub struct MockPanel {
    event_tx: mpsc::UnboundedSender<PanelEvent>,
    lines: [String; DISPLAY_LINES],
    lock_open: bool,
    fail_lock: bool,
}

impl MockPanel {
    pub fn new() -> (Self, MockPanelHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let panel = Self {
            event_tx,
            lines: Default::default(),
            lock_open: false,
            fail_lock: false,
        };
        (panel, MockPanelHandle { event_rx })
    }

    /// A panel whose lock output always fails.
    pub fn with_broken_lock() -> (Self, MockPanelHandle) {
        let (mut panel, handle) = Self::new();
        panel.fail_lock = true;
        (panel, handle)
    }

    pub fn lock_open(&self) -> bool {
        self.lock_open
    }

    pub fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    fn emit(&self, event: PanelEvent) {
        // Nobody listening is fine.
        let _ = self.event_tx.send(event);
    }
}

impl AccessActuator for MockPanel {
    async fn set_lock(&mut self, open: bool) -> Result<()> {
        if self.fail_lock {
            return Err(HardwareError::disconnected("Mock lock relay"));
        }
        self.lock_open = open;
        self.emit(PanelEvent::Lock { open });
        Ok(())
    }

    async fn display_line(&mut self, text: &str, line: u8) -> Result<()> {
        let slot = self
            .lines
            .get_mut(line as usize)
            .ok_or_else(|| HardwareError::invalid_data(format!("no display line {line}")))?;
        *slot = text.to_string();
        self.emit(PanelEvent::Line {
            line,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Receiving end of a [`MockPanel`].
#[derive(Debug)]
pub struct MockPanelHandle {
    event_rx: mpsc::UnboundedReceiver<PanelEvent>,
}

impl MockPanelHandle {
    /// Everything recorded since the last call.
    pub fn drain(&mut self) -> Vec<PanelEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Lock transitions only, in order.
    pub fn lock_history(&mut self) -> Vec<bool> {
        self.drain()
            .into_iter()
            .filter_map(|e| match e {
                PanelEvent::Lock { open } => Some(open),
                PanelEvent::Line { .. } => None,
            })
            .collect()
    }
}
