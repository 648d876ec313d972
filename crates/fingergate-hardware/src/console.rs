use crate::{HardwareError, Result, traits::AccessActuator};
use fingergate_core::constants::DISPLAY_LINES;
use tracing::info;

/// Door panel stand-in that writes lock and display changes to the log.
#[derive(Debug, Default)]
pub struct LogPanel {
    lock_open: bool,
}

impl LogPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccessActuator for LogPanel {
    async fn set_lock(&mut self, open: bool) -> Result<()> {
        if open != self.lock_open {
            info!(open, "lock");
        }
        self.lock_open = open;
        Ok(())
    }

    async fn display_line(&mut self, text: &str, line: u8) -> Result<()> {
        if line as usize >= DISPLAY_LINES {
            return Err(HardwareError::invalid_data(format!("no display line {line}")));
        }
        info!(line, text, "display");
        Ok(())
    }
}
