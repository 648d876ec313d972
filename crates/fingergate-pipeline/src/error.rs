use fingergate_hardware::HardwareError;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Conditions that stop the pipeline.
///
/// Everything that only spoils one cycle is reported as a
/// [`CycleOutcome`](crate::CycleOutcome) instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The sensor could not be opened or stopped responding.
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(#[source] HardwareError),

    /// The lock output failed. The door state is unknown.
    #[error("lock actuator failed: {0}")]
    Actuator(#[source] HardwareError),

    /// The working directory could not be prepared.
    #[error("work directory unavailable: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error(transparent)]
    State(#[from] fingergate_core::Error),
}
