//! Envelope persistence adapters
//!
//! The envelope's fields are the only external storage contract; how they
//! are stored is outside the core's concern. The [`RecordLoader`] and
//! [`RecordStorer`] traits keep that seam abstract, the function adapters
//! let callers plug in closures over their own backend, and
//! [`MemoryRecordStore`] covers tests and development.

use crate::envelope::RecordEnvelope;
use crate::error::{Error, Result};
use crate::{RecordLoader, RecordStorer};

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::RwLock;

/// A function adapter for implementing the [`RecordLoader`] trait
pub struct LoaderFn<K, F>
where
    F: for<'key> Fn(&'key K) -> Result<Option<RecordEnvelope>> + Send + Sync,
    K: Send + Sync,
{
    f: F,
    _key_type: PhantomData<K>,
}

impl<K, F> LoaderFn<K, F>
where
    F: for<'key> Fn(&'key K) -> Result<Option<RecordEnvelope>> + Send + Sync,
    K: Send + Sync,
{
    /// Creates a new loader from the given function
    pub fn new(f: F) -> Self {
        Self {
            f,
            _key_type: PhantomData,
        }
    }
}

impl<K, F> RecordLoader for LoaderFn<K, F>
where
    F: for<'key> Fn(&'key K) -> Result<Option<RecordEnvelope>> + Send + Sync,
    K: Send + Sync,
{
    type Key = K;

    fn load(&self, key: &Self::Key) -> Result<Option<RecordEnvelope>> {
        (self.f)(key)
    }
}

/// A function adapter for implementing the [`RecordStorer`] trait
pub struct StorerFn<K, F>
where
    F: Fn(&RecordEnvelope) -> Result<K> + Send + Sync,
    K: Send + Sync,
{
    f: F,
    _key_type: PhantomData<K>,
}

impl<K, F> StorerFn<K, F>
where
    F: Fn(&RecordEnvelope) -> Result<K> + Send + Sync,
    K: Send + Sync,
{
    /// Creates a new storer from the given function
    pub fn new(f: F) -> Self {
        Self {
            f,
            _key_type: PhantomData,
        }
    }
}

impl<K, F> RecordStorer for StorerFn<K, F>
where
    F: Fn(&RecordEnvelope) -> Result<K> + Send + Sync,
    K: Send + Sync,
{
    type Key = K;

    fn store(&self, envelope: &RecordEnvelope) -> Result<Self::Key> {
        (self.f)(envelope)
    }
}

/// An in-memory envelope store keyed by record index
///
/// Useful for testing; envelopes are lost when the process terminates.
pub struct MemoryRecordStore {
    records: RwLock<HashMap<u32, RecordEnvelope>>,
}

impl MemoryRecordStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordLoader for MemoryRecordStore {
    type Key = u32;

    fn load(&self, key: &Self::Key) -> Result<Option<RecordEnvelope>> {
        let records = self
            .records
            .read()
            .map_err(|_| Error::Internal("record store lock poisoned".into()))?;
        Ok(records.get(key).cloned())
    }
}

impl RecordStorer for MemoryRecordStore {
    type Key = u32;

    fn store(&self, envelope: &RecordEnvelope) -> Result<Self::Key> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::Internal("record store lock poisoned".into()))?;
        records.insert(envelope.record_index, envelope.clone());
        Ok(envelope.record_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    fn sample_envelope(record_index: u32) -> RecordEnvelope {
        let mut envelope = RecordEnvelope {
            record_index,
            encrypted_symptoms: vec![1, 2, 3],
            ..Default::default()
        };
        envelope.wrapped_keys.insert(Role::new("doctor"), vec![7; 16]);
        envelope
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryRecordStore::new();
        let envelope = sample_envelope(9);

        let key = store.store(&envelope).expect("Failed to store envelope");
        assert_eq!(key, 9);

        let loaded = store.load(&key).expect("Failed to load envelope");
        assert_eq!(loaded, Some(envelope));
    }

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryRecordStore::new();
        let loaded = store.load(&404).expect("Failed to load envelope");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_fn_adapters_round_trip_through_json() {
        let backend = RwLock::new(HashMap::<u32, String>::new());
        let envelope = sample_envelope(3);

        let storer = StorerFn::new(|envelope: &RecordEnvelope| {
            let json = serde_json::to_string(envelope)?;
            backend
                .write()
                .map_err(|_| Error::Internal("lock poisoned".into()))?
                .insert(envelope.record_index, json);
            Ok(envelope.record_index)
        });
        let key = storer.store(&envelope).expect("Failed to store envelope");

        let loader = LoaderFn::new(|key: &u32| {
            let backend = backend
                .read()
                .map_err(|_| Error::Internal("lock poisoned".into()))?;
            match backend.get(key) {
                Some(json) => Ok(Some(serde_json::from_str(json)?)),
                None => Ok(None),
            }
        });
        let loaded = loader.load(&key).expect("Failed to load envelope");

        assert_eq!(loaded, Some(envelope));
    }
}
