use crate::crypto::{self, Aes256GcmAead};
use crate::envelope::RecordEnvelope;
use crate::error::{Error, Result};
use crate::key::DataKey;
use crate::media::{self, MediaCategory, MediaFile};
use crate::role::Role;
use crate::wrap::RsaOaepWrapper;
use crate::{Aead, KeyStore, KeyWrapper};

use log::debug;
use metrics::{counter, histogram};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Default directory for restored media files
pub const DEFAULT_MEDIA_DIR: &str = "media";

/// The decrypted text fields of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedRecord {
    /// The symptoms field; empty when the sealed field was absent
    pub symptoms: String,

    /// The diagnosis field; empty when the sealed field was absent
    pub diagnosis: String,
}

/// The outcome of sealing a record from files on disk
#[derive(Debug)]
pub struct SealOutcome {
    /// The sealed envelope
    pub envelope: RecordEnvelope,

    /// Source paths that were read, cleanup candidates after persisting
    /// the envelope
    pub processed: Vec<PathBuf>,
}

/// A per-category media recovery failure
///
/// Recorded instead of aborting so the other category can still be
/// recovered; key unwrapping is the only shared precondition.
#[derive(Debug)]
pub struct MediaFailure {
    /// The category that failed to decrypt or unbundle
    pub category: MediaCategory,

    /// The underlying failure
    pub error: Error,
}

/// Media recovered from one envelope
#[derive(Debug, Default)]
pub struct DecryptedMedia {
    /// Recovered images by original file name
    pub images: BTreeMap<String, Vec<u8>>,

    /// Recovered videos by original file name
    pub videos: BTreeMap<String, Vec<u8>>,

    /// Categories that could not be recovered
    pub failures: Vec<MediaFailure>,
}

impl DecryptedMedia {
    /// Returns true if nothing was recovered and nothing failed
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty() && self.failures.is_empty()
    }

    /// Returns the recovered content as base64 strings per category name
    ///
    /// The shape used for web display: category name mapped to a list of
    /// encoded file contents.
    pub fn to_base64_lists(&self) -> HashMap<String, Vec<String>> {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine as _;

        let mut lists = HashMap::new();
        lists.insert(
            MediaCategory::Image.as_str().to_string(),
            self.images.values().map(|content| STANDARD.encode(content)).collect(),
        );
        lists.insert(
            MediaCategory::Video.as_str().to_string(),
            self.videos.values().map(|content| STANDARD.encode(content)).collect(),
        );
        lists
    }
}

/// Media written back to disk from one envelope
#[derive(Debug, Default)]
pub struct RestoredMedia {
    /// Paths of the files written
    pub written: Vec<PathBuf>,

    /// Categories that could not be recovered
    pub failures: Vec<MediaFailure>,
}

/// Orchestrates the envelope-encryption pipeline
///
/// Sealing generates one data key per record, encrypts every field and
/// media bundle under it, and wraps it once per configured role. Opening
/// reverses the pipeline for a single requesting role. The service holds no
/// mutable state; operations for different records may run fully in
/// parallel.
#[derive(Debug)]
pub struct EnvelopeService {
    keystore: Arc<dyn KeyStore>,
    crypto: Arc<dyn Aead>,
    wrapper: Arc<dyn KeyWrapper>,
    roles: Vec<Role>,
    media_dir: PathBuf,
}

/// Builder for [`EnvelopeService`]
#[derive(Default)]
pub struct EnvelopeServiceBuilder {
    keystore: Option<Arc<dyn KeyStore>>,
    crypto: Option<Arc<dyn Aead>>,
    wrapper: Option<Arc<dyn KeyWrapper>>,
    roles: Vec<Role>,
    media_dir: Option<PathBuf>,
}

impl EnvelopeServiceBuilder {
    /// Creates a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key store
    pub fn with_keystore(mut self, keystore: Arc<dyn KeyStore>) -> Self {
        self.keystore = Some(keystore);
        self
    }

    /// Sets the symmetric cipher; defaults to AES-256-GCM
    pub fn with_crypto(mut self, crypto: Arc<dyn Aead>) -> Self {
        self.crypto = Some(crypto);
        self
    }

    /// Sets the key wrapper; defaults to RSA-OAEP
    pub fn with_wrapper(mut self, wrapper: Arc<dyn KeyWrapper>) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    /// Sets the roles every envelope is sealed for
    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }

    /// Adds one role to the configured set
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Sets the output directory for restored media
    pub fn with_media_dir(mut self, media_dir: impl Into<PathBuf>) -> Self {
        self.media_dir = Some(media_dir.into());
        self
    }

    /// Builds the service
    pub fn build(self) -> Result<EnvelopeService> {
        let keystore = self
            .keystore
            .ok_or_else(|| Error::InvalidArgument("keystore is required".to_string()))?;
        if self.roles.is_empty() {
            return Err(Error::InvalidArgument("at least one role is required".to_string()));
        }

        Ok(EnvelopeService {
            keystore,
            crypto: self.crypto.unwrap_or_else(|| Arc::new(Aes256GcmAead::new())),
            wrapper: self.wrapper.unwrap_or_else(|| Arc::new(RsaOaepWrapper::new())),
            roles: self.roles,
            media_dir: self.media_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_DIR)),
        })
    }
}

impl EnvelopeService {
    /// Creates a new builder
    pub fn builder() -> EnvelopeServiceBuilder {
        EnvelopeServiceBuilder::new()
    }

    /// Returns the roles every envelope is sealed for
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Seals a record into an envelope
    ///
    /// Loads every configured role's public key up front, generates one
    /// fresh data key, encrypts the text fields and the per-category media
    /// bundles under it, and wraps the key once per role. Empty inputs stay
    /// empty ciphertext fields. Any failing step aborts the whole
    /// operation; no partial envelope is ever produced.
    pub fn seal(
        &self,
        record_index: u32,
        symptoms: &str,
        diagnosis: &str,
        files: &[MediaFile],
    ) -> Result<RecordEnvelope> {
        let start = Instant::now();
        counter!("renc.envelope.seal", 1);

        // All public keys before any data is touched: a record must always
        // be recoverable by every configured role
        let mut public_keys = Vec::with_capacity(self.roles.len());
        for role in &self.roles {
            public_keys.push((role, self.keystore.load_public_key(role)?));
        }

        let key = DataKey::generate();

        let encrypted_symptoms = self.encrypt_text(symptoms, &key)?;
        let encrypted_diagnosis = self.encrypt_text(diagnosis, &key)?;

        let (images, videos) = media::partition_files(files);
        let encrypted_images = self.encrypt_bundle(&images, &key)?;
        let encrypted_videos = self.encrypt_bundle(&videos, &key)?;

        let mut wrapped_keys = HashMap::with_capacity(public_keys.len());
        for (role, public_key) in &public_keys {
            let wrapped = self.wrapper.wrap_key(&key, public_key)?;
            wrapped_keys.insert((*role).clone(), wrapped);
        }

        debug!("sealed record {} for {} roles", record_index, wrapped_keys.len());
        histogram!("renc.envelope.seal.time", start.elapsed());

        Ok(RecordEnvelope {
            record_index,
            encrypted_symptoms,
            encrypted_diagnosis,
            encrypted_images,
            encrypted_videos,
            wrapped_keys,
        })
    }

    /// Seals a record, reading its media files from disk
    ///
    /// Missing paths are skipped. Returns the envelope together with the
    /// list of paths actually read, the cleanup candidates once the
    /// envelope is persisted (see [`media::delete_processed_files`]).
    pub fn seal_paths(
        &self,
        record_index: u32,
        symptoms: &str,
        diagnosis: &str,
        paths: &[PathBuf],
    ) -> Result<SealOutcome> {
        let partition = media::partition_paths(paths)?;

        let mut files = partition.images;
        files.extend(partition.videos);
        let envelope = self.seal(record_index, symptoms, diagnosis, &files)?;

        Ok(SealOutcome {
            envelope,
            processed: partition.processed,
        })
    }

    /// Opens the text fields of an envelope for a role
    ///
    /// Fails with [`Error::KeyNotFound`] if the role's private key is
    /// absent, [`Error::NoAccessGrant`] if the envelope carries no wrapped
    /// key for the role, and [`Error::Unwrap`] if the key cannot be
    /// recovered. A decryption failure in either text field aborts the
    /// call.
    pub fn open(&self, envelope: &RecordEnvelope, role: &Role) -> Result<DecryptedRecord> {
        let start = Instant::now();
        counter!("renc.envelope.open", 1);

        let key = self.recover_key(envelope, role)?;

        let symptoms = self.decrypt_text(&envelope.encrypted_symptoms, &key)?;
        let diagnosis = self.decrypt_text(&envelope.encrypted_diagnosis, &key)?;

        histogram!("renc.envelope.open.time", start.elapsed());
        Ok(DecryptedRecord { symptoms, diagnosis })
    }

    /// Opens the media bundles of an envelope for a role
    ///
    /// Key recovery is the shared precondition and its failures abort the
    /// call. Past that point each category is decrypted and unbundled
    /// independently: a failure in one is recorded in
    /// [`DecryptedMedia::failures`] and does not block the other. An empty
    /// field yields an empty mapping, never an error.
    pub fn open_media(&self, envelope: &RecordEnvelope, role: &Role) -> Result<DecryptedMedia> {
        let start = Instant::now();
        counter!("renc.envelope.open_media", 1);

        let key = self.recover_key(envelope, role)?;

        let mut recovered = DecryptedMedia::default();
        for category in [MediaCategory::Image, MediaCategory::Video] {
            let field = envelope.encrypted_media(category);
            if field.is_empty() {
                continue;
            }
            match self.decrypt_bundle(field, &key) {
                Ok(entries) => match category {
                    MediaCategory::Image => recovered.images = entries,
                    MediaCategory::Video => recovered.videos = entries,
                },
                Err(error) => recovered.failures.push(MediaFailure { category, error }),
            }
        }

        histogram!("renc.envelope.open_media.time", start.elapsed());
        Ok(recovered)
    }

    /// Recovers an envelope's media and writes it back to disk
    ///
    /// Each recovered entry is written to the media directory as
    /// `restored_<record_index>_<original_name>`, so restores of different
    /// records cannot collide. Concurrent restores of the same record are
    /// not serialized here; callers must coordinate those. Per-category
    /// failure semantics match [`EnvelopeService::open_media`].
    pub fn restore_media(&self, envelope: &RecordEnvelope, role: &Role) -> Result<RestoredMedia> {
        counter!("renc.envelope.restore", 1);

        let recovered = self.open_media(envelope, role)?;
        if recovered.is_empty() {
            return Ok(RestoredMedia::default());
        }

        std::fs::create_dir_all(&self.media_dir)?;

        let mut restored = RestoredMedia {
            written: Vec::new(),
            failures: recovered.failures,
        };
        for (name, content) in recovered.images.iter().chain(recovered.videos.iter()) {
            let path = self.restored_path(envelope.record_index, name);
            std::fs::write(&path, content)?;
            debug!("restored media file {}", path.display());
            restored.written.push(path);
        }
        Ok(restored)
    }

    /// Recovers the envelope's data key for a role
    ///
    /// The sole access-control checkpoint for every open path.
    fn recover_key(&self, envelope: &RecordEnvelope, role: &Role) -> Result<DataKey> {
        let private_key = self.keystore.load_private_key(role)?;
        let wrapped = envelope
            .wrapped_key(role)
            .ok_or_else(|| Error::NoAccessGrant(role.to_string()))?;
        self.wrapper.unwrap_key(wrapped, &private_key)
    }

    fn encrypt_text(&self, text: &str, key: &DataKey) -> Result<Vec<u8>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        crypto::encrypt_utf8(self.crypto.as_ref(), text, key.as_bytes())
    }

    fn decrypt_text(&self, data: &[u8], key: &DataKey) -> Result<String> {
        if data.is_empty() {
            return Ok(String::new());
        }
        crypto::decrypt_utf8(self.crypto.as_ref(), data, key.as_bytes())
    }

    fn encrypt_bundle(&self, files: &[&MediaFile], key: &DataKey) -> Result<Vec<u8>> {
        // An empty category stays an empty field rather than an encrypted
        // empty archive, so the envelope does not leak "zero files" as
        // ciphertext
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let archive = media::bundle(files.iter().copied())?;
        self.crypto.encrypt(&archive, key.as_bytes())
    }

    fn decrypt_bundle(&self, data: &[u8], key: &DataKey) -> Result<BTreeMap<String, Vec<u8>>> {
        let archive = self.crypto.decrypt(data, key.as_bytes())?;
        media::unbundle(&archive)
    }

    fn restored_path(&self, record_index: u32, name: &str) -> PathBuf {
        // Bundle entry names may carry path components; keep only the final
        // one when touching the filesystem
        let base = Path::new(name)
            .file_name()
            .map(|base| base.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        self.media_dir.join(format!("restored_{}_{}", record_index, base))
    }
}
