//! Image format conversion boundary.
//!
//! The pipeline routes HEIC/HEIF images through an [`ImageConverter`]
//! instead of a plain move, so the placed file carries a `.jpg` extension.
//! Real transcoding is out of scope for the core: the shipped
//! [`PassthroughConverter`] copies bytes unchanged and exists purely so a
//! codec-backed implementation can be injected without touching the
//! pipeline.

use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to read source image {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write converted image {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Converts an image file into the format implied by the target path.
///
/// Contract: on success a valid image exists at `dest`; on failure `dest`
/// is absent and `source` is untouched.
pub trait ImageConverter: Send + Sync {
    fn convert(&self, source: &Path, dest: &Path) -> Result<(), ConvertError>;
}

/// Placeholder converter that copies bytes verbatim.
///
/// This does NOT transcode; the output is the original HEIC payload under a
/// `.jpg` name. It stages through a temporary file in the destination
/// directory so a failed copy never leaves a partial file at `dest`.
pub struct PassthroughConverter;

impl ImageConverter for PassthroughConverter {
    fn convert(&self, source: &Path, dest: &Path) -> Result<(), ConvertError> {
        let dest_dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut staging =
            tempfile::NamedTempFile::new_in(dest_dir).map_err(|e| ConvertError::Write {
                path: dest.to_path_buf(),
                source: e,
            })?;

        let mut input = std::fs::File::open(source).map_err(|e| ConvertError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        io::copy(&mut input, &mut staging).map_err(|e| ConvertError::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;

        staging.persist(dest).map_err(|e| ConvertError::Write {
            path: dest.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }
}
