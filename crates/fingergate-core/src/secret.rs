//! Operator-provisioned shared secret.

use serde::Deserialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Text secret shared between the device and the enrollment server.
///
/// The only use of the secret is key derivation. The backing buffer is wiped
/// on drop and the value never appears in `Debug` output.
///
/// # Examples
///
/// ```
/// use fingergate_core::SharedSecret;
///
/// let secret = SharedSecret::new("YourSecretKey123");
/// assert_eq!(secret.expose(), b"YourSecretKey123");
/// assert_eq!(format!("{:?}", secret), "SharedSecret(<redacted>)");
/// ```
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw bytes of the secret, as fed to the key derivation hash.
    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SharedSecret::new("hunter2");
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }

    #[test]
    fn test_deserialize_transparent() {
        let secret: SharedSecret = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(secret.expose(), b"abc");
        assert!(!secret.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        assert!(SharedSecret::default().is_empty());
    }
}
