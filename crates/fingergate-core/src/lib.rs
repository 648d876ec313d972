//! Shared domain types for the fingergate door client.
//!
//! Everything that more than one pipeline stage needs to agree on lives here:
//! the finger enumeration used on the wire, the device hardware identifier,
//! length-bounded text used for server decisions, the shared secret wrapper,
//! and the device configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod secret;
pub mod types;

pub use config::DeviceConfig;
pub use error::{Error, Result};
pub use secret::SharedSecret;
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
