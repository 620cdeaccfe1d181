use crate::error::{Error, Result};
use crate::key::DataKey;
use crate::KeyWrapper;
use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// RSA-OAEP (SHA-256) implementation of the [`KeyWrapper`] trait
///
/// Wraps the 32 raw bytes of a [`DataKey`] under a role's RSA public key.
/// A 2048-bit modulus leaves ample room for the key plus OAEP overhead.
#[derive(Default, Debug, Clone)]
pub struct RsaOaepWrapper;

impl RsaOaepWrapper {
    /// Creates a new RSA-OAEP wrapper
    pub fn new() -> Self {
        Self
    }
}

impl KeyWrapper for RsaOaepWrapper {
    fn wrap_key(&self, key: &DataKey, public_key: &RsaPublicKey) -> Result<Vec<u8>> {
        public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), key.as_bytes())
            .map_err(|_| Error::Crypto("key wrap failed".into()))
    }

    fn unwrap_key(&self, wrapped: &[u8], private_key: &RsaPrivateKey) -> Result<DataKey> {
        // One message for every failure cause: a wrong private key and a
        // malformed blob must be indistinguishable to the caller
        let bytes = private_key
            .decrypt(Oaep::new::<Sha256>(), wrapped)
            .map_err(|_| Error::Unwrap("unable to recover record key".into()))?;
        DataKey::from_bytes(bytes)
    }
}
