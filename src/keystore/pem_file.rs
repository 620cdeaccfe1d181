use crate::config::KeyStoreConfig;
use crate::error::{Error, Result};
use crate::role::Role;
use crate::KeyStore;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::io::ErrorKind;
use std::path::Path;

/// A [`KeyStore`] backed by PEM files on local disk
///
/// Public keys are SPKI PEM, private keys PKCS#8 PEM, at the locations the
/// [`KeyStoreConfig`] maps each role to. Files are read on every call; key
/// material is immutable for the process lifetime so callers may cache.
#[derive(Debug, Clone)]
pub struct PemFileKeyStore {
    config: KeyStoreConfig,
}

impl PemFileKeyStore {
    /// Creates a new key store over the given configuration
    pub fn new(config: KeyStoreConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this store resolves roles against
    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    fn read_pem(&self, role: &Role, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::KeyNotFound(format!("no key file for role {} at {}", role, path.display()))
            } else {
                Error::Io(e)
            }
        })
    }
}

impl KeyStore for PemFileKeyStore {
    fn load_public_key(&self, role: &Role) -> Result<RsaPublicKey> {
        let paths = self
            .config
            .role_paths(role)
            .ok_or_else(|| Error::KeyNotFound(format!("role {} is not configured", role)))?;

        let pem = self.read_pem(role, &paths.public_key)?;
        RsaPublicKey::from_public_key_pem(&pem)
            .map_err(|_| Error::KeyFormat(format!("unparsable public key for role {}", role)))
    }

    fn load_private_key(&self, role: &Role) -> Result<RsaPrivateKey> {
        let paths = self
            .config
            .role_paths(role)
            .ok_or_else(|| Error::KeyNotFound(format!("role {} is not configured", role)))?;

        let pem = self.read_pem(role, &paths.private_key)?;
        RsaPrivateKey::from_pkcs8_pem(&pem)
            .map_err(|_| Error::KeyFormat(format!("unparsable private key for role {}", role)))
    }
}
