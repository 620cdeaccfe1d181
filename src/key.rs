//! The per-record symmetric data key

use crate::error::{Error, Result};
use crate::AES256_KEY_SIZE;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

/// The symmetric key protecting one record's payload
///
/// A data key is generated fresh for every seal operation, used for every
/// field and media bundle in that envelope, and exists unwrapped only for
/// the duration of a single seal or open call. The backing bytes are wiped
/// when the key is dropped.
pub struct DataKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl DataKey {
    /// Generates a new random data key from the OS CSPRNG
    ///
    /// Every call yields an independent key with no derivation from other
    /// data.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0_u8; AES256_KEY_SIZE]);
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a data key from recovered raw bytes
    ///
    /// Fails with [`Error::Unwrap`] if the material is not a valid key
    /// length, since the only producer of raw key bytes is an unwrap
    /// operation.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != AES256_KEY_SIZE {
            return Err(Error::Unwrap("unable to recover record key".into()));
        }
        Ok(Self {
            bytes: Zeroizing::new(bytes),
        })
    }

    /// Provides access to the raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey").field("bytes", &"<hidden>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_independent() {
        let a = DataKey::generate();
        let b = DataKey::generate();
        assert_eq!(a.as_bytes().len(), AES256_KEY_SIZE);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_from_bytes_rejects_bad_length() {
        assert!(DataKey::from_bytes(vec![0_u8; 16]).is_err());
        assert!(DataKey::from_bytes(vec![0_u8; AES256_KEY_SIZE]).is_ok());
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = DataKey::generate();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("<hidden>"));
    }
}
