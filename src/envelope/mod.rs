//! The record envelope and the service that seals and opens it
//!
//! An envelope is the persisted unit of one record's protected data: the
//! symmetric-cipher output of the two text fields and of the per-category
//! media bundles, plus the record's data key wrapped once per authorized
//! role. It is a plain value with no internal state machine; it is created
//! whole by one seal operation and never mutated except by whole-field
//! replacement.

pub mod service;

use crate::media::MediaCategory;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use service::{
    DecryptedMedia, DecryptedRecord, EnvelopeService, EnvelopeServiceBuilder, MediaFailure,
    RestoredMedia, SealOutcome,
};

/// The encrypted form of one clinical record
///
/// All six byte fields are outputs of the same data key; the key itself is
/// present only in wrapped form, once per role. Empty ciphertext fields mean
/// the corresponding plaintext was absent, not that encryption failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordEnvelope {
    /// Stable identifier, used only to namespace restored media filenames
    pub record_index: u32,

    /// Symmetric-cipher output of the symptoms field; empty if absent
    pub encrypted_symptoms: Vec<u8>,

    /// Symmetric-cipher output of the diagnosis field; empty if absent
    pub encrypted_diagnosis: Vec<u8>,

    /// Symmetric-cipher output of the image bundle; empty if no images
    pub encrypted_images: Vec<u8>,

    /// Symmetric-cipher output of the video bundle; empty if no videos
    pub encrypted_videos: Vec<u8>,

    /// The record's data key, independently wrapped under each role's
    /// public key
    pub wrapped_keys: HashMap<Role, Vec<u8>>,
}

impl RecordEnvelope {
    /// Returns the wrapped data key for a role, if the role was granted
    /// access to this record
    ///
    /// An empty entry counts as no grant.
    pub fn wrapped_key(&self, role: &Role) -> Option<&[u8]> {
        self.wrapped_keys
            .get(role)
            .filter(|wrapped| !wrapped.is_empty())
            .map(Vec::as_slice)
    }

    /// Returns the roles holding a non-empty access grant
    pub fn granted_roles(&self) -> impl Iterator<Item = &Role> {
        self.wrapped_keys
            .iter()
            .filter(|(_, wrapped)| !wrapped.is_empty())
            .map(|(role, _)| role)
    }

    /// Returns the encrypted bundle for a media category
    pub fn encrypted_media(&self, category: MediaCategory) -> &[u8] {
        match category {
            MediaCategory::Image => &self.encrypted_images,
            MediaCategory::Video => &self.encrypted_videos,
        }
    }

    /// Returns true if the envelope carries any encrypted media
    pub fn has_media(&self) -> bool {
        !self.encrypted_images.is_empty() || !self.encrypted_videos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let mut envelope = RecordEnvelope {
            record_index: 42,
            encrypted_symptoms: vec![1, 2, 3],
            ..Default::default()
        };
        envelope.wrapped_keys.insert(Role::new("doctor"), vec![9, 9]);

        let json = serde_json::to_string(&envelope).expect("Failed to serialize");
        let decoded: RecordEnvelope = serde_json::from_str(&json).expect("Failed to deserialize");

        assert_eq!(envelope, decoded);
    }

    #[test]
    fn test_empty_wrapped_entry_is_no_grant() {
        let mut envelope = RecordEnvelope::default();
        envelope.wrapped_keys.insert(Role::new("doctor"), vec![1]);
        envelope.wrapped_keys.insert(Role::new("nurse"), Vec::new());

        assert!(envelope.wrapped_key(&Role::new("doctor")).is_some());
        assert!(envelope.wrapped_key(&Role::new("nurse")).is_none());
        assert_eq!(envelope.granted_roles().count(), 1);
    }

    #[test]
    fn test_has_media() {
        let mut envelope = RecordEnvelope::default();
        assert!(!envelope.has_media());

        envelope.encrypted_videos = vec![0xAA];
        assert!(envelope.has_media());
    }
}
