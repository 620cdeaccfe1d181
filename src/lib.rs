//! # Record Encryption Library
//!
//! `recordencryption` provides role-gated envelope encryption for clinical
//! record data. Each record's payload (free-text fields and bundled media
//! files) is encrypted once with a freshly generated symmetric data key, and
//! that data key is independently wrapped under the public key of every
//! configured role. Only a holder of a matching private key can recover the
//! data key, and therefore the payload.
//!
//! The crate is organized around a small set of trait seams declared here in
//! the crate root: [`Aead`] for bulk symmetric encryption, [`KeyStore`] for
//! loading a role's asymmetric key material, and [`KeyWrapper`] for wrapping
//! the data key. [`envelope::EnvelopeService`] composes them into the
//! seal/open pipeline.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use recordencryption::envelope::EnvelopeService;
//! use recordencryption::keystore::InMemoryKeyStore;
//! use recordencryption::media::MediaFile;
//! use recordencryption::role::Role;
//! use std::sync::Arc;
//!
//! # fn example() -> recordencryption::Result<()> {
//! let doctor = Role::new("doctor");
//! let nurse = Role::new("nurse");
//!
//! // In production the keys come from PEM files via PemFileKeyStore
//! let keystore = InMemoryKeyStore::new();
//! keystore.generate_role(&doctor)?;
//! keystore.generate_role(&nurse)?;
//!
//! let service = EnvelopeService::builder()
//!     .with_keystore(Arc::new(keystore))
//!     .with_roles(vec![doctor.clone(), nurse])
//!     .with_media_dir("media")
//!     .build()?;
//!
//! // Seal a record: one data key, wrapped once per role
//! let files = vec![MediaFile::new("scan.png", vec![0x89, 0x50, 0x4e, 0x47])];
//! let envelope = service.seal(7, "persistent cough", "bronchitis", &files)?;
//!
//! // Any configured role can open it with its own private key
//! let record = service.open(&envelope, &doctor)?;
//! assert_eq!(record.symptoms, "persistent cough");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod key;
pub mod keystore;
pub mod media;
pub mod persistence;
pub mod role;
pub mod users;
pub mod wrap;

// Re-export key types
pub use crate::config::{KeyStoreConfig, RoleKeyPaths};
pub use crate::crypto::Aes256GcmAead;
pub use crate::envelope::{DecryptedMedia, DecryptedRecord, EnvelopeService, RecordEnvelope};
pub use crate::error::{Error, Result};
pub use crate::key::DataKey;
pub use crate::keystore::{InMemoryKeyStore, PemFileKeyStore};
pub use crate::media::{MediaCategory, MediaFile};
pub use crate::role::Role;
pub use crate::wrap::RsaOaepWrapper;

use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;

/// Size of an AES-256 data key in bytes
pub const AES256_KEY_SIZE: usize = 32;

/// AEAD (Authenticated Encryption with Associated Data) interface
///
/// Used for all bulk payload encryption. Implementations must be
/// tamper-evident: decryption of modified ciphertext fails rather than
/// returning altered plaintext.
pub trait Aead: Send + Sync + fmt::Debug {
    /// Encrypts data using the provided key
    fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts data using the provided key
    fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>>;
}

/// Interface for loading a role's asymmetric key material
///
/// Key material is immutable for the process lifetime, so implementations
/// are not required to cache and callers may cache at their discretion.
pub trait KeyStore: Send + Sync + fmt::Debug {
    /// Loads the public key for a role
    ///
    /// Fails with [`Error::KeyNotFound`] if the role has no key material and
    /// [`Error::KeyFormat`] if the material is present but unparsable.
    fn load_public_key(&self, role: &Role) -> Result<RsaPublicKey>;

    /// Loads the private key for a role
    ///
    /// Failure modes match [`KeyStore::load_public_key`].
    fn load_private_key(&self, role: &Role) -> Result<RsaPrivateKey>;
}

/// Interface for wrapping and unwrapping a data key under asymmetric keys
///
/// Applied to key material only, never to bulk payloads. Unwrapping is the
/// sole access-control checkpoint: possession of the matching private key is
/// necessary and sufficient to recover the data key.
pub trait KeyWrapper: Send + Sync + fmt::Debug {
    /// Wraps the raw data key bytes under a public key
    fn wrap_key(&self, key: &DataKey, public_key: &RsaPublicKey) -> Result<Vec<u8>>;

    /// Unwraps a wrapped data key using a private key
    ///
    /// Fails with [`Error::Unwrap`] if the private key does not correspond to
    /// the wrapping public key or the wrapped bytes are malformed.
    fn unwrap_key(&self, wrapped: &[u8], private_key: &RsaPrivateKey) -> Result<DataKey>;
}

/// Loader interface for fetching envelopes from a persistence store
pub trait RecordLoader: Send + Sync {
    /// Type of the key used to look up the envelope
    type Key: Send + Sync;

    /// Loads an envelope from the store using the provided key
    fn load(&self, key: &Self::Key) -> Result<Option<RecordEnvelope>>;
}

/// Storer interface for writing envelopes to a persistence store
pub trait RecordStorer: Send + Sync {
    /// Type of the key returned after storing the envelope
    type Key;

    /// Stores an envelope and returns a key for future lookup
    fn store(&self, envelope: &RecordEnvelope) -> Result<Self::Key>;
}
