use crate::error::{Error, Result};
use crate::keystore::provision;
use crate::role::Role;
use crate::KeyStore;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// An in-memory implementation of the [`KeyStore`] trait
///
/// This implementation holds key pairs in process memory, which is useful
/// for testing but should not be used in production as private keys are
/// lost when the process terminates.
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<Role, RsaPrivateKey>>,
}

impl InMemoryKeyStore {
    /// Creates a new empty key store
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an existing private key for a role
    ///
    /// The public half is derived from the private key on load.
    pub fn insert_key_pair(&self, role: Role, private_key: RsaPrivateKey) -> Result<()> {
        let mut keys = self
            .keys
            .write()
            .map_err(|_| Error::Internal("key store lock poisoned".into()))?;
        keys.insert(role, private_key);
        Ok(())
    }

    /// Generates and registers a fresh key pair for a role
    pub fn generate_role(&self, role: &Role) -> Result<()> {
        let (private_key, _) = provision::generate_key_pair()?;
        self.insert_key_pair(role.clone(), private_key)
    }

    fn private_key(&self, role: &Role) -> Result<RsaPrivateKey> {
        let keys = self
            .keys
            .read()
            .map_err(|_| Error::Internal("key store lock poisoned".into()))?;
        keys.get(role)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(format!("no key pair registered for role {}", role)))
    }
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<Role> = match self.keys.read() {
            Ok(keys) => keys.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        f.debug_struct("InMemoryKeyStore")
            .field("roles", &roles)
            .field("keys", &"<hidden>")
            .finish()
    }
}

impl KeyStore for InMemoryKeyStore {
    fn load_public_key(&self, role: &Role) -> Result<RsaPublicKey> {
        Ok(RsaPublicKey::from(&self.private_key(role)?))
    }

    fn load_private_key(&self, role: &Role) -> Result<RsaPrivateKey> {
        self.private_key(role)
    }
}
