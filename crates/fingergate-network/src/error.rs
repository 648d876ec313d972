use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Failures below the HTTP layer.
///
/// A response with any status code, 4xx and 5xx included, is not an error.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Init(String),

    /// The encrypted file could not be read.
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No response within the configured timeout.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Connection refused, unreachable host, TLS handshake failure.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure while sending or reading the response.
    #[error("request failed: {0}")]
    Request(String),
}
