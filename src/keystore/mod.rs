//! Key store implementations
//!
//! This module provides implementations for loading a role's asymmetric key
//! material:
//!
//! - [`PemFileKeyStore`] reads PEM files at configuration-known locations
//! - [`InMemoryKeyStore`] holds generated key pairs, for testing and development
//! - [`provision`] generates key pairs and writes them to a role's
//!   configured paths
//!
//! Custom stores (hardware tokens, remote key services) can be added by
//! implementing the [`KeyStore`](crate::KeyStore) trait.

mod memory;
mod pem_file;
pub mod provision;

pub use memory::InMemoryKeyStore;
pub use pem_file::PemFileKeyStore;
