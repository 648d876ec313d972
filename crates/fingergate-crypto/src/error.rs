//! Error types for encryption and decryption.

use std::path::PathBuf;

/// Result type alias for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors raised by the cipher engine.
///
/// Each variant is fatal for the single operation that produced it.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The plaintext source could not be opened.
    #[error("cannot open input {path}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ciphertext sink could not be created.
    #[error("cannot create output {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key or IV rejected by the cipher.
    #[error("cipher initialization failed: {message}")]
    CipherInit { message: String },

    /// Read or write failure while streaming.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encrypted input is shorter than the IV prefix.
    #[error("encrypted data too short: {len} bytes")]
    TooShort { len: usize },

    /// Ciphertext length is not a multiple of the block size.
    #[error("ciphertext length {len} is not block aligned")]
    Misaligned { len: usize },

    /// Padding check failed after decryption, usually a wrong key.
    #[error("invalid padding")]
    BadPadding,
}

impl CryptoError {
    pub fn cipher_init(message: impl Into<String>) -> Self {
        Self::CipherInit {
            message: message.into(),
        }
    }
}
