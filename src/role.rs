use serde::{Deserialize, Serialize};
use std::fmt;


/// An opaque identifier for a class of authorized reader
///
/// A role resolves to a long-lived asymmetric key pair through a
/// [`KeyStore`](crate::KeyStore). The envelope's wrapped-key storage is keyed
/// by role name, so any number of roles can be configured without special
/// casing. Role names are compared case-insensitively and stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Creates a new role from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_lowercase())
    }

    /// Returns the role name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
