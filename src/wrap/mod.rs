//! Asymmetric wrapping of the per-record data key
//!
//! The [`KeyWrapper`](crate::KeyWrapper) seam covers key material only;
//! bulk payloads never touch the asymmetric path. Unwrapping is the sole
//! access-control checkpoint, so its failure mode is a single uniform
//! [`Error::Unwrap`](crate::Error::Unwrap) whatever the underlying cause.

mod rsa_oaep;

pub use rsa_oaep::RsaOaepWrapper;
