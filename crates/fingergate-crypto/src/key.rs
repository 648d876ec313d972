//! Derivation of the AES-128 key from the shared secret.

use fingergate_core::SharedSecret;
use fingergate_core::constants::KEY_SIZE;
use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

const DIGEST_SIZE: usize = 32;

/// AES-128 key. Wiped on drop, never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Hash the secret with SHA-256 and keep the first [`KEY_SIZE`] bytes.
///
/// Deterministic and infallible. Callers recompute the key for every
/// encryption instead of caching it.
pub fn derive_key(secret: &SharedSecret) -> SymmetricKey {
    let mut digest = Zeroizing::new([0u8; DIGEST_SIZE]);
    let mut hasher = Sha256::new();
    hasher.update(secret.expose());
    hasher.finalize_into(GenericArray::from_mut_slice(&mut digest[..]));

    let mut key = SymmetricKey([0u8; KEY_SIZE]);
    key.0.copy_from_slice(&digest[..KEY_SIZE]);
    key
}
