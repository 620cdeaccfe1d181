//! Media file classification and bundling
//!
//! Files attached to a record are classified into images and videos by
//! filename extension against a fixed allow-list, packed per category into a
//! zip bundle, and the bundle is what gets symmetrically encrypted.
//! Extension-based sniffing rather than content inspection is a deliberate,
//! documented simplification.

mod bundle;

pub use bundle::{bundle, unbundle};

use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File extensions classified as images
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// File extensions classified as videos
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi"];

/// The media categories an envelope carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaCategory {
    /// Still images (`jpg`, `jpeg`, `png`)
    Image,
    /// Video clips (`mp4`, `avi`)
    Video,
}

impl MediaCategory {
    /// Classifies a file name by its extension, case-insensitively
    ///
    /// Returns `None` for files matching neither allow-list; such files are
    /// excluded from both bundles but still counted as processed.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Returns the category name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named media file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Original file name (no directory components expected)
    pub name: String,

    /// Raw file content
    pub content: Vec<u8>,
}

impl MediaFile {
    /// Creates a new media file
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Returns the category this file classifies into, if any
    pub fn category(&self) -> Option<MediaCategory> {
        MediaCategory::from_file_name(&self.name)
    }
}

/// The result of partitioning source files for one seal operation
#[derive(Debug, Default)]
pub struct MediaPartition {
    /// Files classified as images
    pub images: Vec<MediaFile>,

    /// Files classified as videos
    pub videos: Vec<MediaFile>,

    /// Every source path that was read, including unclassified files;
    /// the cleanup candidates after a successful seal
    pub processed: Vec<PathBuf>,
}

/// Splits in-memory files into image and video lists
///
/// Files matching neither allow-list are dropped from both.
pub fn partition_files(files: &[MediaFile]) -> (Vec<&MediaFile>, Vec<&MediaFile>) {
    let mut images = Vec::new();
    let mut videos = Vec::new();
    for file in files {
        match file.category() {
            Some(MediaCategory::Image) => images.push(file),
            Some(MediaCategory::Video) => videos.push(file),
            None => {}
        }
    }
    (images, videos)
}

/// Reads and classifies source files from disk
///
/// Paths that do not exist are skipped silently; everything that was read
/// lands in [`MediaPartition::processed`] whether or not it classified.
pub fn partition_paths(paths: &[PathBuf]) -> Result<MediaPartition> {
    let mut partition = MediaPartition::default();

    for path in paths {
        if !path.exists() {
            debug!("skipping missing media file {}", path.display());
            continue;
        }
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let content = std::fs::read(path)?;

        match MediaCategory::from_file_name(&name) {
            Some(MediaCategory::Image) => partition.images.push(MediaFile::new(name, content)),
            Some(MediaCategory::Video) => partition.videos.push(MediaFile::new(name, content)),
            None => {}
        }
        partition.processed.push(path.clone());
    }

    Ok(partition)
}

/// Deletes source media files after a successful seal
///
/// Failures are logged and do not stop the sweep; returns the number of
/// files actually removed.
pub fn delete_processed_files(paths: &[PathBuf]) -> usize {
    let mut deleted = 0;
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => deleted += 1,
            Err(e) => warn!("failed to delete {}: {}", path.display(), e),
        }
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(MediaCategory::from_file_name("scan.PNG"), Some(MediaCategory::Image));
        assert_eq!(MediaCategory::from_file_name("visit.Mp4"), Some(MediaCategory::Video));
        assert_eq!(MediaCategory::from_file_name("xray.JpEg"), Some(MediaCategory::Image));
    }

    #[test]
    fn test_unlisted_extensions_do_not_classify() {
        assert_eq!(MediaCategory::from_file_name("notes.txt"), None);
        assert_eq!(MediaCategory::from_file_name("scan.gif"), None);
        assert_eq!(MediaCategory::from_file_name("no_extension"), None);
    }

    #[test]
    fn test_partition_files_drops_unclassified() {
        let files = vec![
            MediaFile::new("a.jpg", vec![1]),
            MediaFile::new("b.avi", vec![2]),
            MediaFile::new("c.txt", vec![3]),
        ];

        let (images, videos) = partition_files(&files);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "a.jpg");
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].name, "b.avi");
    }

    #[test]
    fn test_partition_paths_skips_missing_and_counts_processed() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let image = dir.path().join("scan.png");
        let note = dir.path().join("note.txt");
        std::fs::write(&image, b"png bytes").expect("Failed to write file");
        std::fs::write(&note, b"plain text").expect("Failed to write file");
        let missing = dir.path().join("gone.jpg");

        let partition = partition_paths(&[image.clone(), note.clone(), missing])
            .expect("Failed to partition paths");

        assert_eq!(partition.images.len(), 1);
        assert_eq!(partition.images[0].content, b"png bytes");
        assert!(partition.videos.is_empty());
        // The unclassified note counts as processed; the missing path does not
        assert_eq!(partition.processed, vec![image, note]);
    }

    #[test]
    fn test_delete_processed_files_continues_past_failures() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let present = dir.path().join("scan.png");
        std::fs::write(&present, b"png bytes").expect("Failed to write file");
        let missing = dir.path().join("gone.jpg");

        let deleted = delete_processed_files(&[missing, present.clone()]);
        assert_eq!(deleted, 1);
        assert!(!present.exists());
    }
}
