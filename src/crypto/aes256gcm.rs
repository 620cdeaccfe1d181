use crate::crypto::{fill_random, GCM_MAX_DATA_SIZE, GCM_NONCE_SIZE, GCM_TAG_SIZE};
use crate::error::{Error, Result};
use crate::Aead;
use aes_gcm::aead::{Aead as AeadTrait, KeyInit};
use aes_gcm::{Aes256Gcm, Key as AesKey, Nonce};

/// AES-256-GCM implementation of the [`Aead`] trait
#[derive(Default, Debug, Clone)]
pub struct Aes256GcmAead;

impl Aes256GcmAead {
    /// Creates a new instance of the AES-256-GCM cipher
    pub fn new() -> Self {
        Self
    }
}

impl Aead for Aes256GcmAead {
    fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        if data.len() > GCM_MAX_DATA_SIZE {
            return Err(Error::Crypto("data too large for GCM".into()));
        }

        let cipher = Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(key));

        // Fresh random nonce per call; reuse under the same key would break GCM
        let mut nonce_bytes = [0_u8; GCM_NONCE_SIZE];
        fill_random(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|_| Error::Crypto("encryption failed".into()))?;

        // Layout: nonce || ciphertext || tag (tag is appended by the cipher)
        let mut out = Vec::with_capacity(GCM_NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        if data.len() < GCM_NONCE_SIZE + GCM_TAG_SIZE {
            return Err(Error::Decryption("ciphertext too short".into()));
        }

        let cipher = Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(key));
        let nonce = Nonce::from_slice(&data[..GCM_NONCE_SIZE]);

        cipher
            .decrypt(nonce, &data[GCM_NONCE_SIZE..])
            .map_err(|_| Error::Decryption("ciphertext authentication failed".into()))
    }
}
