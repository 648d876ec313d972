//! Core constants for the enrollment/verification client.
//!
//! These values are shared between the device and the enrollment server.
//! Changing any of them breaks compatibility with deployed servers: the key
//! and block sizes must match the server's AES-128-CBC configuration, the form
//! field names must match its multipart binding, and the decision field cap
//! must match what the display layer expects.
//!
//! # Usage
//!
//! ```
//! use fingergate_core::constants::*;
//!
//! assert_eq!(KEY_SIZE, 16);
//! assert_eq!(BLOCK_SIZE, 16);
//! assert_eq!(FIELD_HARDWARE_ID, "hardwareId");
//! ```

// ============================================================================
// Cryptography
// ============================================================================

/// Symmetric key size in bytes (AES-128).
///
/// The key is the first `KEY_SIZE` bytes of a SHA-256 digest of the shared
/// secret.
pub const KEY_SIZE: usize = 16;

/// Cipher block size in bytes. Also the size of the IV prefix of every
/// encrypted file.
pub const BLOCK_SIZE: usize = 16;

/// Plaintext chunk size used by the streaming encryptor.
pub const CIPHER_CHUNK_SIZE: usize = 1024;

// ============================================================================
// Image container
// ============================================================================

/// Physical resolution of the fingerprint sensor in dots per inch.
pub const SENSOR_DPI: u32 = 500;

/// Number of entries in the grayscale palette.
pub const PALETTE_ENTRIES: usize = 256;

// ============================================================================
// Enrollment request
// ============================================================================

/// Multipart field carrying the encrypted image container.
pub const FIELD_FILE: &str = "file";

/// Multipart field carrying the finger type label.
pub const FIELD_TYPE: &str = "type";

/// Multipart field carrying the device hardware identifier.
pub const FIELD_HARDWARE_ID: &str = "hardwareId";

/// Content type of the encrypted file part.
pub const ENCRYPTED_CONTENT_TYPE: &str = "application/octet-stream";

// ============================================================================
// Server decision
// ============================================================================

/// Maximum number of characters kept from the `message` and `nameOfUser`
/// response fields.
pub const MAX_DECISION_FIELD_CHARS: usize = 255;

// ============================================================================
// Display
// ============================================================================

/// Character width of one line of the door LCD.
pub const DEFAULT_DISPLAY_WIDTH: usize = 16;

/// Number of lines on the door LCD.
pub const DISPLAY_LINES: usize = 2;

// ============================================================================
// Timing defaults (milliseconds)
// ============================================================================

/// Total time allowed for one enrollment request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

/// Time allowed to establish the TCP/TLS connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// How long the lock stays open after a granted decision.
pub const DEFAULT_UNLOCK_DWELL_MS: u64 = 3_000;

/// Interval between finger-presence polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Pause before retrying a frame after a transient sensor error.
pub const DEFAULT_CAPTURE_BACKOFF_MS: u64 = 100;

/// Pause before the next cycle after a fatal hardware error.
pub const DEFAULT_FAULT_BACKOFF_MS: u64 = 5_000;
