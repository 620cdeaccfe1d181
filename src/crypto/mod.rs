//! Symmetric cipher primitives
//!
//! All bulk payload encryption goes through the [`Aead`](crate::Aead) trait;
//! [`Aes256GcmAead`] is the only implementation. Ciphertext is laid out as
//! `nonce || ciphertext || tag` with a fresh random nonce per call, so the
//! cipher is tamper-evident and never returns unauthenticated plaintext.

mod aes256gcm;

pub use aes256gcm::Aes256GcmAead;

use crate::error::{Error, Result};
use crate::Aead;
use rand::rngs::OsRng;
use rand::RngCore;

/// Size of the GCM nonce prefixed to every ciphertext
pub(crate) const GCM_NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag appended to every ciphertext
pub(crate) const GCM_TAG_SIZE: usize = 16;

// Maximum message size supported by GCM: ((1 << 32) - 2) AES blocks
pub(crate) const GCM_MAX_DATA_SIZE: usize = ((1 << 32) - 2) * 16;

/// Fills a buffer with cryptographically secure random bytes
pub fn fill_random(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

/// Encrypts a UTF-8 string under a symmetric key
///
/// Thin wrapper over the byte form for the record's free-text fields.
pub fn encrypt_utf8(crypto: &dyn Aead, text: &str, key: &[u8]) -> Result<Vec<u8>> {
    crypto.encrypt(text.as_bytes(), key)
}

/// Decrypts a ciphertext produced by [`encrypt_utf8`] back into a string
///
/// Plaintext that is not valid UTF-8 is treated as a decryption failure;
/// the cipher's authentication makes this unreachable for untampered data.
pub fn decrypt_utf8(crypto: &dyn Aead, data: &[u8], key: &[u8]) -> Result<String> {
    let plaintext = crypto.decrypt(data, key)?;
    String::from_utf8(plaintext).map_err(|_| Error::Decryption("plaintext is not valid UTF-8".into()))
}
