//! Key storage configuration
//!
//! Role names and their key-file locations are passed in explicitly at
//! startup rather than living as global constants, so the core can run
//! against fixture keys in tests and against any directory layout in
//! production.

use crate::role::Role;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Locations of one role's key pair on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleKeyPaths {
    /// Path to the role's public key (SPKI PEM)
    pub public_key: PathBuf,

    /// Path to the role's private key (PKCS#8 PEM)
    pub private_key: PathBuf,
}

/// Mapping from role names to key-pair locations
#[derive(Debug, Clone, Default)]
pub struct KeyStoreConfig {
    roles: HashMap<Role, RoleKeyPaths>,
}

impl KeyStoreConfig {
    /// Creates an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the two standard clinical roles under a key directory
    ///
    /// Uses the well-known layout `<dir>/<role>_public.pem` and
    /// `<dir>/<role>_private.pem` for the `doctor` and `nurse` roles.
    pub fn standard_roles(dir: impl AsRef<Path>) -> Self {
        Self::new()
            .with_role_dir(Role::new("doctor"), &dir)
            .with_role_dir(Role::new("nurse"), &dir)
    }

    /// Registers a role with explicit key-file paths
    pub fn with_role(
        mut self,
        role: Role,
        public_key: impl Into<PathBuf>,
        private_key: impl Into<PathBuf>,
    ) -> Self {
        self.roles.insert(
            role,
            RoleKeyPaths {
                public_key: public_key.into(),
                private_key: private_key.into(),
            },
        );
        self
    }

    /// Registers a role using the well-known layout under a key directory
    pub fn with_role_dir(self, role: Role, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let public_key = dir.join(format!("{}_public.pem", role));
        let private_key = dir.join(format!("{}_private.pem", role));
        self.with_role(role, public_key, private_key)
    }

    /// Returns the key-pair locations for a role, if configured
    pub fn role_paths(&self, role: &Role) -> Option<&RoleKeyPaths> {
        self.roles.get(role)
    }

    /// Returns the configured roles
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.keys()
    }

    /// Returns the number of configured roles
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true if no roles are configured
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
