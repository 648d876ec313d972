//! Streaming AES-128-CBC encryption with an IV prefix.

use crate::error::{CryptoError, Result};
use crate::key::{SymmetricKey, derive_key};
use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use fingergate_core::SharedSecret;
use fingergate_core::constants::{BLOCK_SIZE, CIPHER_CHUNK_SIZE};
use rand::{CryptoRng, RngCore};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use tracing::debug;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Initialization vector. Not secret, but must be fresh for every
/// encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv([u8; BLOCK_SIZE]);

impl Iv {
    pub fn from_bytes(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }
}

/// Draw a new IV from a cryptographically secure generator.
pub fn generate_iv<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Iv {
    let mut iv = [0u8; BLOCK_SIZE];
    rng.fill_bytes(&mut iv);
    Iv(iv)
}

/// Encrypt everything `reader` yields into `writer`.
///
/// The IV is written first, then the input is consumed in
/// [`CIPHER_CHUNK_SIZE`] pieces. Whole blocks are encrypted as they arrive
/// and the remainder is carried into the next chunk, so only the final block
/// is padded. Returns the number of bytes written, IV included.
///
/// # Errors
/// `CryptoError::Io` on a read or write failure, `CryptoError::CipherInit`
/// if the cipher rejects the key or IV.
pub fn encrypt_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    key: &SymmetricKey,
    iv: &Iv,
) -> Result<u64> {
    let mut encryptor = Aes128CbcEnc::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| CryptoError::cipher_init(e.to_string()))?;

    writer.write_all(iv.as_bytes())?;
    let mut written = BLOCK_SIZE as u64;

    let mut chunk = [0u8; CIPHER_CHUNK_SIZE];
    let mut pending: Vec<u8> = Vec::with_capacity(CIPHER_CHUNK_SIZE + BLOCK_SIZE);

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        pending.extend_from_slice(&chunk[..n]);

        let aligned = pending.len() - pending.len() % BLOCK_SIZE;
        if aligned == 0 {
            continue;
        }
        for block in pending[..aligned].chunks_exact_mut(BLOCK_SIZE) {
            encryptor.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        writer.write_all(&pending[..aligned])?;
        written += aligned as u64;
        pending.drain(..aligned);
    }

    // Fewer than BLOCK_SIZE bytes remain; padding always yields one block.
    let last = encryptor.encrypt_padded_vec_mut::<Pkcs7>(&pending);
    writer.write_all(&last)?;
    writer.flush()?;
    written += last.len() as u64;

    Ok(written)
}

/// Encrypt the file at `input` into a new file at `output`.
///
/// The key is derived from `secret` for this call only and a fresh IV is
/// drawn from `rng`. A partially written output is left in place on failure.
///
/// # Errors
/// `OpenInput` / `CreateOutput` when the paths cannot be opened, otherwise
/// whatever [`encrypt_stream`] reports.
pub fn encrypt_file<R: RngCore + CryptoRng + ?Sized>(
    input: &Path,
    output: &Path,
    secret: &SharedSecret,
    rng: &mut R,
) -> Result<u64> {
    let source = File::open(input).map_err(|source| CryptoError::OpenInput {
        path: input.to_path_buf(),
        source,
    })?;
    let sink = File::create(output).map_err(|source| CryptoError::CreateOutput {
        path: output.to_path_buf(),
        source,
    })?;

    let key = derive_key(secret);
    let iv = generate_iv(rng);
    let written = encrypt_stream(source, BufWriter::new(sink), &key, &iv)?;

    debug!(
        input = %input.display(),
        output = %output.display(),
        bytes = written,
        "encrypted image"
    );
    Ok(written)
}

/// Split off the IV prefix and decrypt the rest.
///
/// # Errors
/// `TooShort` when there is no room for the IV and one block,
/// `Misaligned` for a ciphertext that is not a whole number of blocks,
/// `BadPadding` when the padding check fails.
pub fn decrypt(encrypted: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
    if encrypted.len() < 2 * BLOCK_SIZE {
        return Err(CryptoError::TooShort {
            len: encrypted.len(),
        });
    }
    let (iv, ciphertext) = encrypted.split_at(BLOCK_SIZE);
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::Misaligned {
            len: ciphertext.len(),
        });
    }

    Aes128CbcDec::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| CryptoError::cipher_init(e.to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::BadPadding)
}
