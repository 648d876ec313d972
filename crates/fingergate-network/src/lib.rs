//! Enrollment transport.
//!
//! Sends the encrypted fingerprint and its metadata to the enrollment server
//! as `multipart/form-data` and hands back the HTTP status and the raw body.
//! Interpreting the body is left to the caller.
//!
//! ```text
//! AccessPipeline
//!     │
//!     └─> EnrollmentTransport::submit ──(HTTP POST)──> enrollment server
//!             file       = IV ‖ AES-128-CBC(BMP)
//!             type       = THUMB | INDEX | MIDDLE
//!             hardwareId = XX:XX:XX:XX:XX:XX
//! ```

pub mod error;
pub mod http;
pub mod transport;

pub use error::{Result, TransportError};
pub use http::{HttpClientConfig, HttpEnrollmentClient};
pub use transport::{EnrollmentTransport, TransportResponse};
