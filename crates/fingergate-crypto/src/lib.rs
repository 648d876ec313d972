//! Key derivation and file encryption for fingerprint images.
//!
//! The device and the enrollment server share a text secret. Both sides hash
//! it with SHA-256 and keep the first 16 bytes as an AES-128 key. Every
//! encrypted file is laid out as:
//!
//! ```text
//! [IV: 16 bytes][AES-128-CBC ciphertext, PKCS#7 padded]
//! ```
//!
//! # Examples
//!
//! ```
//! use fingergate_core::SharedSecret;
//! use fingergate_crypto::{decrypt, derive_key, encrypt_stream, generate_iv};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let key = derive_key(&SharedSecret::new("YourSecretKey123"));
//! let iv = generate_iv(&mut StdRng::seed_from_u64(1));
//!
//! let mut out = Vec::new();
//! encrypt_stream(&b"BM..."[..], &mut out, &key, &iv).unwrap();
//! assert_eq!(decrypt(&out, &key).unwrap(), b"BM...");
//! ```

pub mod cipher;
pub mod error;
pub mod key;

pub use cipher::{Iv, decrypt, encrypt_file, encrypt_stream, generate_iv};
pub use error::{CryptoError, Result};
pub use key::{SymmetricKey, derive_key};
