//! Wire contract with the enrollment server.
//!
//! Outbound, an [`EnrollmentRequest`] names the encrypted file and the two
//! text fields of the multipart form. Inbound, a [`DecisionParser`] turns the
//! response body into a [`ServerDecision`](fingergate_core::ServerDecision).
//!
//! The default parser, [`MarkerScanParser`], does not implement JSON. It
//! looks for three literal markers and copies what follows them, which is
//! the behavior deployed servers are tested against. [`JsonDecisionParser`]
//! is a drop-in alternative backed by `serde_json`.

pub mod decision;
pub mod json;
pub mod request;

pub use decision::{DecisionParser, MarkerScanParser, parse_decision};
pub use json::JsonDecisionParser;
pub use request::EnrollmentRequest;
