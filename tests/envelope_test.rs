// End-to-end tests for the seal/open envelope pipeline using in-memory
// fixture keys for the two standard clinical roles.

use recordencryption::envelope::EnvelopeService;
use recordencryption::keystore::InMemoryKeyStore;
use recordencryption::media::{self, MediaCategory, MediaFile};
use recordencryption::role::Role;
use recordencryption::{Error, RecordEnvelope};
use std::path::PathBuf;
use std::sync::Arc;

const SYMPTOMS: &str = "persistent cough, mild fever";
const DIAGNOSIS: &str = "acute bronchitis";

fn two_role_service(media_dir: &std::path::Path) -> (EnvelopeService, Role, Role) {
    let _ = env_logger::builder().is_test(true).try_init();

    let doctor = Role::new("doctor");
    let nurse = Role::new("nurse");

    let keystore = InMemoryKeyStore::new();
    keystore.generate_role(&doctor).expect("Failed to generate doctor keys");
    keystore.generate_role(&nurse).expect("Failed to generate nurse keys");

    let service = EnvelopeService::builder()
        .with_keystore(Arc::new(keystore))
        .with_roles(vec![doctor.clone(), nurse.clone()])
        .with_media_dir(media_dir)
        .build()
        .expect("Failed to build service");

    (service, doctor, nurse)
}

fn sample_files() -> Vec<MediaFile> {
    vec![
        MediaFile::new("xray.png", vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a]),
        MediaFile::new("wound.jpg", vec![0xff, 0xd8, 0xff, 0xe0, 0x00]),
        MediaFile::new("gait.mp4", vec![0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70]),
    ]
}

#[test]
fn test_text_round_trip_for_both_roles() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, nurse) = two_role_service(dir.path());

    let envelope = service
        .seal(1, SYMPTOMS, DIAGNOSIS, &[])
        .expect("Failed to seal record");

    for role in [&doctor, &nurse] {
        let record = service.open(&envelope, role).expect("Failed to open record");
        assert_eq!(record.symptoms, SYMPTOMS);
        assert_eq!(record.diagnosis, DIAGNOSIS);
    }
}

#[test]
fn test_media_round_trip_for_both_roles() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, nurse) = two_role_service(dir.path());
    let files = sample_files();

    let envelope = service
        .seal(2, SYMPTOMS, DIAGNOSIS, &files)
        .expect("Failed to seal record");
    assert!(envelope.has_media());

    for role in [&doctor, &nurse] {
        let recovered = service.open_media(&envelope, role).expect("Failed to open media");
        assert!(recovered.failures.is_empty());
        assert_eq!(recovered.images.len(), 2);
        assert_eq!(recovered.images["xray.png"], files[0].content);
        assert_eq!(recovered.images["wound.jpg"], files[1].content);
        assert_eq!(recovered.videos.len(), 1);
        assert_eq!(recovered.videos["gait.mp4"], files[2].content);
    }
}

#[test]
fn test_cross_role_isolation() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, nurse) = two_role_service(dir.path());

    let envelope = service
        .seal(3, SYMPTOMS, DIAGNOSIS, &[])
        .expect("Failed to seal record");

    // Forge the nurse's grant from the doctor's wrapped key: unwrapping it
    // with the nurse's private key must fail, never yield a working key
    let doctor_wrapped = envelope
        .wrapped_key(&doctor)
        .expect("doctor grant should exist")
        .to_vec();
    let mut forged = envelope.clone();
    forged.wrapped_keys.insert(nurse.clone(), doctor_wrapped);

    let result = service.open(&forged, &nurse);
    assert!(matches!(result, Err(Error::Unwrap(_))));
}

#[test]
fn test_each_seal_uses_an_independent_key() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, _) = two_role_service(dir.path());
    let files = sample_files();

    let first = service
        .seal(4, SYMPTOMS, DIAGNOSIS, &files)
        .expect("Failed to seal record");
    let second = service
        .seal(4, SYMPTOMS, DIAGNOSIS, &files)
        .expect("Failed to seal record");

    assert_ne!(first.encrypted_symptoms, second.encrypted_symptoms);
    assert_ne!(first.encrypted_images, second.encrypted_images);
    assert_ne!(
        first.wrapped_keys[&doctor], second.wrapped_keys[&doctor],
        "wrapped keys should differ across seals"
    );

    // Both still decrypt to the same plaintext
    for envelope in [&first, &second] {
        let record = service.open(envelope, &doctor).expect("Failed to open record");
        assert_eq!(record.symptoms, SYMPTOMS);
    }
}

#[test]
fn test_tampered_ciphertext_is_rejected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, _) = two_role_service(dir.path());

    let mut envelope = service
        .seal(5, SYMPTOMS, DIAGNOSIS, &[])
        .expect("Failed to seal record");

    let last = envelope.encrypted_symptoms.len() - 1;
    envelope.encrypted_symptoms[last] ^= 0x01;

    let result = service.open(&envelope, &doctor);
    assert!(matches!(result, Err(Error::Decryption(_))));
}

#[test]
fn test_empty_media_yields_empty_fields_and_empty_mapping() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, _) = two_role_service(dir.path());

    let envelope = service
        .seal(6, SYMPTOMS, DIAGNOSIS, &[])
        .expect("Failed to seal record");

    assert!(envelope.encrypted_images.is_empty());
    assert!(envelope.encrypted_videos.is_empty());

    let recovered = service.open_media(&envelope, &doctor).expect("Failed to open media");
    assert!(recovered.is_empty());
}

#[test]
fn test_empty_text_fields_round_trip_as_empty_strings() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, _) = two_role_service(dir.path());

    let envelope = service.seal(7, "", "", &[]).expect("Failed to seal record");
    assert!(envelope.encrypted_symptoms.is_empty());
    assert!(envelope.encrypted_diagnosis.is_empty());

    let record = service.open(&envelope, &doctor).expect("Failed to open record");
    assert_eq!(record.symptoms, "");
    assert_eq!(record.diagnosis, "");
}

#[test]
fn test_missing_grant_is_no_access_not_a_crash() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, _, nurse) = two_role_service(dir.path());

    let envelope = service
        .seal(8, SYMPTOMS, DIAGNOSIS, &[])
        .expect("Failed to seal record");

    // Deleted grant
    let mut without_grant = envelope.clone();
    without_grant.wrapped_keys.remove(&nurse);
    let result = service.open(&without_grant, &nurse);
    assert!(matches!(result, Err(Error::NoAccessGrant(_))));

    // Emptied grant is equivalent to a deleted one
    let mut emptied = envelope;
    emptied.wrapped_keys.insert(nurse.clone(), Vec::new());
    let result = service.open_media(&emptied, &nurse);
    assert!(matches!(result, Err(Error::NoAccessGrant(_))));
}

#[test]
fn test_unprovisioned_role_is_key_not_found() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, _, _) = two_role_service(dir.path());

    let envelope = service
        .seal(9, SYMPTOMS, DIAGNOSIS, &[])
        .expect("Failed to seal record");

    let result = service.open(&envelope, &Role::new("auditor"));
    assert!(matches!(result, Err(Error::KeyNotFound(_))));
}

#[test]
fn test_seal_requires_every_configured_role_key() {
    let doctor = Role::new("doctor");
    let nurse = Role::new("nurse");

    // Only the doctor is provisioned; sealing must fail up front
    let keystore = InMemoryKeyStore::new();
    keystore.generate_role(&doctor).expect("Failed to generate doctor keys");

    let service = EnvelopeService::builder()
        .with_keystore(Arc::new(keystore))
        .with_roles(vec![doctor, nurse])
        .build()
        .expect("Failed to build service");

    let result = service.seal(10, SYMPTOMS, DIAGNOSIS, &[]);
    assert!(matches!(result, Err(Error::KeyNotFound(_))));
}

#[test]
fn test_partial_media_recovery_survives_one_corrupt_category() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, _) = two_role_service(dir.path());
    let files = sample_files();

    let mut envelope = service
        .seal(11, SYMPTOMS, DIAGNOSIS, &files)
        .expect("Failed to seal record");

    let last = envelope.encrypted_images.len() - 1;
    envelope.encrypted_images[last] ^= 0x01;

    let recovered = service.open_media(&envelope, &doctor).expect("Failed to open media");
    assert_eq!(recovered.videos.len(), 1, "intact category should still recover");
    assert!(recovered.images.is_empty());
    assert_eq!(recovered.failures.len(), 1);
    assert_eq!(recovered.failures[0].category, MediaCategory::Image);
    assert!(matches!(recovered.failures[0].error, Error::Decryption(_)));
}

#[test]
fn test_unclassified_files_are_excluded_from_bundles() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, _) = two_role_service(dir.path());

    let files = vec![MediaFile::new("notes.txt", vec![1, 2, 3])];
    let envelope = service
        .seal(12, SYMPTOMS, DIAGNOSIS, &files)
        .expect("Failed to seal record");

    assert!(!envelope.has_media());
    let recovered = service.open_media(&envelope, &doctor).expect("Failed to open media");
    assert!(recovered.is_empty());
}

#[test]
fn test_restore_media_namespaces_files_by_record_index() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let media_dir = dir.path().join("restored");
    let (service, _, nurse) = two_role_service(&media_dir);
    let files = sample_files();

    let envelope = service
        .seal(13, SYMPTOMS, DIAGNOSIS, &files)
        .expect("Failed to seal record");

    let restored = service
        .restore_media(&envelope, &nurse)
        .expect("Failed to restore media");
    assert!(restored.failures.is_empty());
    assert_eq!(restored.written.len(), 3);

    let expected = media_dir.join("restored_13_xray.png");
    assert!(restored.written.contains(&expected));
    let content = std::fs::read(&expected).expect("Failed to read restored file");
    assert_eq!(content, files[0].content);

    // A different record restores under its own namespace, no collision
    let other = service
        .seal(14, SYMPTOMS, DIAGNOSIS, &files)
        .expect("Failed to seal record");
    let restored_other = service
        .restore_media(&other, &nurse)
        .expect("Failed to restore media");
    assert!(restored_other.written.contains(&media_dir.join("restored_14_xray.png")));
}

#[test]
fn test_seal_paths_reads_disk_and_reports_processed() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let intake = dir.path().join("intake");
    std::fs::create_dir_all(&intake).expect("Failed to create intake dir");

    let image = intake.join("xray.png");
    let note = intake.join("notes.txt");
    std::fs::write(&image, b"png bytes").expect("Failed to write file");
    std::fs::write(&note, b"plain text").expect("Failed to write file");
    let missing = intake.join("gone.mp4");

    let (service, doctor, _) = two_role_service(dir.path());
    let paths: Vec<PathBuf> = vec![image.clone(), note.clone(), missing];

    let outcome = service
        .seal_paths(15, SYMPTOMS, DIAGNOSIS, &paths)
        .expect("Failed to seal record from paths");

    // The note counts as processed but is excluded from both bundles
    assert_eq!(outcome.processed, vec![image.clone(), note.clone()]);
    assert!(!outcome.envelope.encrypted_images.is_empty());
    assert!(outcome.envelope.encrypted_videos.is_empty());

    let recovered = service
        .open_media(&outcome.envelope, &doctor)
        .expect("Failed to open media");
    assert_eq!(recovered.images["xray.png"], b"png bytes");

    // Post-seal cleanup of the intake files
    let deleted = media::delete_processed_files(&outcome.processed);
    assert_eq!(deleted, 2);
    assert!(!image.exists());
    assert!(!note.exists());
}

#[test]
fn test_envelope_round_trips_through_json_persistence() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (service, doctor, _) = two_role_service(dir.path());

    let envelope = service
        .seal(16, SYMPTOMS, DIAGNOSIS, &sample_files())
        .expect("Failed to seal record");

    let json = serde_json::to_string(&envelope).expect("Failed to serialize envelope");
    let reloaded: RecordEnvelope = serde_json::from_str(&json).expect("Failed to deserialize envelope");
    assert_eq!(reloaded, envelope);

    let record = service.open(&reloaded, &doctor).expect("Failed to open record");
    assert_eq!(record.symptoms, SYMPTOMS);
}
