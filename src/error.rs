use thiserror::Error;

/// Result type for recordencryption operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the recordencryption library
#[derive(Error, Debug)]
pub enum Error {
    /// A role's key material is absent from the key store
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// A role's key material is present but not parsable
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// A wrapped data key could not be recovered with the supplied private key
    ///
    /// The message is deliberately uniform for a wrong key and a malformed
    /// wrapped blob; callers must surface both as "no access".
    #[error("Key unwrap failed: {0}")]
    Unwrap(String),

    /// Ciphertext could not be decrypted (key mismatch or tampering)
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// A media bundle buffer is not a well-formed archive
    #[error("Media archive corrupt: {0}")]
    ArchiveCorrupt(String),

    /// The envelope carries no wrapped-key entry for the requesting role
    #[error("No access grant for role: {0}")]
    NoAccessGrant(String),

    /// Errors from the encrypt side of cryptographic operations
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Errors related to JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors related to I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument error
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// General internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
