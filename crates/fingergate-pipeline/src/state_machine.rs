//! Access cycle state machine.
//!
//! # States
//!
//! - `Idle`: between cycles
//! - `CaptureRequested`: prompting for a finger and reading a frame
//! - `Encoding`: writing the frame as an image container
//! - `Encrypting`: encrypting the container
//! - `Transmitting`: submitting the enrollment request
//! - `Deciding`: reading the server's verdict
//! - `Actuating`: driving the lock and the display
//!
//! # Valid Transitions
//!
//! - Idle → CaptureRequested → Encoding → Encrypting → Transmitting → Deciding → Actuating → Idle
//! - CaptureRequested → CaptureRequested (transient sensor error, retry)
//! - CaptureRequested → Idle (no finger, fatal sensor error)
//! - Encoding / Encrypting / Transmitting → CaptureRequested (local failure)
//!
//! # Examples
//!
//! ```
//! use fingergate_pipeline::{PipelineState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! machine.transition_to(PipelineState::CaptureRequested).unwrap();
//! assert!(machine.transition_to(PipelineState::Deciding).is_err());
//! ```

use fingergate_core::{Error, Result};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Maximum number of state transitions to keep in history.
///
/// A clean cycle is 7 transitions, so this covers the last dozen or so
/// cycles including retries.
const MAX_HISTORY_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    CaptureRequested,
    Encoding,
    Encrypting,
    Transmitting,
    Deciding,
    Actuating,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            PipelineState::Idle => "Idle",
            PipelineState::CaptureRequested => "CaptureRequested",
            PipelineState::Encoding => "Encoding",
            PipelineState::Encrypting => "Encrypting",
            PipelineState::Transmitting => "Transmitting",
            PipelineState::Deciding => "Deciding",
            PipelineState::Actuating => "Actuating",
        };
        write!(f, "{}", state_str)
    }
}

impl PipelineState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use fingergate_pipeline::PipelineState;
    ///
    /// assert!(PipelineState::Idle.can_transition_to(&PipelineState::CaptureRequested));
    /// assert!(!PipelineState::Idle.can_transition_to(&PipelineState::Actuating));
    /// ```
    pub fn can_transition_to(&self, target: &PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, target),
            // Main line
            (Idle, CaptureRequested)
            | (CaptureRequested, Encoding)
            | (Encoding, Encrypting)
            | (Encrypting, Transmitting)
            | (Transmitting, Deciding)
            | (Deciding, Actuating)
            | (Actuating, Idle)
            // Capture retry or abandon
            | (CaptureRequested, CaptureRequested | Idle)
            // Local failure, skip actuation
            | (Encoding | Encrypting | Transmitting, CaptureRequested)
        )
    }

    /// States in which a failure skips actuation and restarts capture.
    pub fn is_local_stage(&self) -> bool {
        matches!(
            self,
            PipelineState::Encoding | PipelineState::Encrypting | PipelineState::Transmitting
        )
    }
}

#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: PipelineState,
    pub to: PipelineState,
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: PipelineState, to: PipelineState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Tracks the current state and a bounded transition history.
#[derive(Debug)]
pub struct StateMachine {
    current_state: PipelineState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current_state: PipelineState::Idle,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> &PipelineState {
        &self.current_state
    }

    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Transition to a new state.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the move is not allowed;
    /// the machine is left unchanged.
    pub fn transition_to(&mut self, new_state: PipelineState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());
        Ok(transition)
    }

    /// Force the machine back to `Idle`, whatever the current state.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::new(self.current_state, PipelineState::Idle);
        self.perform_state_change(PipelineState::Idle, transition.clone());
        transition
    }

    fn perform_state_change(&mut self, new_state: PipelineState, transition: StateTransition) {
        self.current_state = new_state;
        self.state_entered_at = Instant::now();

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
