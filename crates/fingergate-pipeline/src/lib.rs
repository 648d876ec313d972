//! Fingergate access pipeline.
//!
//! Ties the sensor, image codec, cipher, transport and door panel together
//! into the capture → encode → encrypt → transmit → decide → actuate cycle,
//! tracked by a [`StateMachine`] and reported as a [`CycleOutcome`].

pub mod display;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod state_machine;

pub use display::{Alignment, Screen, align_text, compose_greeting, fit_line, truncate_text};
pub use error::{PipelineError, Result};
pub use outcome::{CycleOutcome, DenialReason};
pub use pipeline::AccessPipeline;
pub use state_machine::{PipelineState, StateMachine, StateTransition};
