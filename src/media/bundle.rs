use crate::error::{Error, Result};
use crate::media::MediaFile;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Packs named files into a single zip archive buffer
///
/// Entry metadata uses a fixed timestamp so the container layout is
/// deterministic for a given input sequence. An empty input yields a valid
/// empty archive.
pub fn bundle<'a, I>(files: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a MediaFile>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for file in files {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        writer
            .start_file(file.name.as_str(), options)
            .map_err(|e| Error::Internal(format!("archive write failed: {}", e)))?;
        writer.write_all(&file.content)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| Error::Internal(format!("archive write failed: {}", e)))?;
    Ok(cursor.into_inner())
}

/// Unpacks an archive buffer back into a name-to-content mapping
///
/// Entry bytes round-trip exactly. Duplicate entry names resolve
/// last-write-wins; collisions are not expected in normal operation.
pub fn unbundle(archive: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut zip = ZipArchive::new(Cursor::new(archive))
        .map_err(|e| Error::ArchiveCorrupt(format!("not a well-formed archive: {}", e)))?;

    let mut files = BTreeMap::new();
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::ArchiveCorrupt(format!("unreadable entry: {}", e)))?;
        if entry.is_dir() {
            continue;
        }
        let mut content = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::ArchiveCorrupt(format!("truncated entry: {}", e)))?;
        files.insert(entry.name().to_string(), content);
    }
    Ok(files)
}
