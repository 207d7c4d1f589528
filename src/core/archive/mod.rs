//! ZIP expansion into a scratch directory.
//!
//! Only ZIP archives are genuinely expanded; every other archive extension
//! is recognized but routed whole to the archives folder by the pipeline.
//! Extraction is tolerant: a failed entry is removed and skipped, and a
//! partial scratch tree still counts as a successful expansion because the
//! caller re-walks whatever was produced.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("Archive format not supported for extraction: {path}")]
    Unsupported { path: PathBuf },

    #[error("Failed to open archive {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("Failed to create scratch directory {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Expand a ZIP archive into a scratch directory beside it.
///
/// Returns the scratch path; the caller processes its contents and removes
/// it. Directory entries and entries with unsafe names are skipped.
pub fn expand(archive_path: &Path) -> Result<PathBuf, ExpandError> {
    let extension = crate::core::classify::extension_lower(archive_path);
    if extension.as_deref() != Some("zip") {
        return Err(ExpandError::Unsupported {
            path: archive_path.to_path_buf(),
        });
    }

    let file = File::open(archive_path).map_err(|e| ExpandError::Open {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExpandError::Open {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let scratch = scratch_dir(archive_path);
    fs::create_dir_all(&scratch).map_err(|e| ExpandError::Scratch {
        path: scratch.clone(),
        source: e,
    })?;

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(archive = %archive_path.display(), index, error = %e, "unreadable zip entry");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        // enclosed_name rejects entries that would escape the scratch tree
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(archive = %archive_path.display(), name = entry.name(), "skipping entry with unsafe path");
            continue;
        };
        let out_path = scratch.join(relative);

        if let Some(parent) = out_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "could not create directory for zip entry");
                continue;
            }
        }

        let result = File::create(&out_path).and_then(|mut out| io::copy(&mut entry, &mut out));
        if let Err(e) = result {
            tracing::warn!(path = %out_path.display(), error = %e, "failed to extract zip entry");
            // Leave no partial entry behind; keep going with the rest
            let _ = fs::remove_file(&out_path);
        }
    }

    Ok(scratch)
}

fn scratch_dir(archive_path: &Path) -> PathBuf {
    let stem = archive_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("archive");
    archive_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("extract_{stem}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn expands_entries_preserving_structure() {
        let dir = tempfile::TempDir::new().unwrap();
        let zip_path = dir.path().join("photos.zip");
        build_zip(
            &zip_path,
            &[
                ("a.jpg", b"image a".as_slice()),
                ("nested/b.jpg", b"image b".as_slice()),
            ],
        );

        let scratch = expand(&zip_path).unwrap();

        assert_eq!(scratch, dir.path().join("extract_photos"));
        assert_eq!(fs::read(scratch.join("a.jpg")).unwrap(), b"image a");
        assert_eq!(fs::read(scratch.join("nested/b.jpg")).unwrap(), b"image b");
    }

    #[test]
    fn non_zip_extension_is_unsupported() {
        let result = expand(Path::new("/some/backup.rar"));
        assert!(matches!(result, Err(ExpandError::Unsupported { .. })));
    }

    #[test]
    fn corrupt_zip_fails_to_open() {
        let dir = tempfile::TempDir::new().unwrap();
        let zip_path = dir.path().join("broken.zip");
        fs::write(&zip_path, b"not a zip archive at all").unwrap();

        let result = expand(&zip_path);
        assert!(matches!(result, Err(ExpandError::Open { .. })));
    }
}
