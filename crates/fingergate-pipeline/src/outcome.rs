use crate::state_machine::PipelineState;
use fingergate_core::DecisionText;
use fingergate_hardware::SensorErrorCode;
use std::fmt;

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The server answered `success: false`.
    Rejected,
    /// The response carried no `success` field at all.
    MissingVerdict,
}

/// How one access cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The door was opened for `subject`.
    Granted {
        subject: DecisionText,
        display_text: String,
    },
    Denied {
        reason: DenialReason,
    },
    /// The scanner reported an error that retrying will not fix.
    HardwareFault {
        code: SensorErrorCode,
    },
    /// No finger arrived within the presence timeout.
    NoFinger,
    /// Capture, encoding or encryption failed on the device.
    LocalFailure {
        stage: PipelineState,
    },
    /// The request never produced an HTTP response.
    TransportFailed,
}

impl CycleOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, CycleOutcome::Granted { .. })
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Granted { subject, .. } => write!(f, "granted to {subject}"),
            CycleOutcome::Denied { reason } => write!(f, "denied ({reason:?})"),
            CycleOutcome::HardwareFault { code } => write!(f, "hardware fault: {code}"),
            CycleOutcome::NoFinger => write!(f, "no finger"),
            CycleOutcome::LocalFailure { stage } => write!(f, "local failure in {stage}"),
            CycleOutcome::TransportFailed => write!(f, "transport failed"),
        }
    }
}
