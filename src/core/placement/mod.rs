//! Deduplication and collision-resolved placement.
//!
//! The engine owns the two injected services (dedup registry, directory
//! cache) and the image converter. It is purely mechanical: it returns
//! what happened and leaves tallying and event emission to the pipeline.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::convert::ImageConverter;
use crate::core::fingerprint::file_fingerprint;
use crate::core::registry::{DedupRegistry, DirectoryCache};
use crate::error::FileError;

/// Outcome of a placement attempt
#[derive(Debug)]
pub enum Placement {
    Placed {
        final_path: PathBuf,
        /// A numeric disambiguator was appended to avoid a name collision
        renamed: bool,
        /// The file went through the image converter
        converted: bool,
    },
    /// Identical content was already placed in this folder earlier in the
    /// run; the source has been deleted
    SameRunDuplicate,
    /// A file with identical content already existed on disk; the source
    /// has been deleted
    ExistingDuplicate { existing: PathBuf },
}

pub struct PlacementEngine {
    registry: DedupRegistry,
    dirs: DirectoryCache,
    converter: Box<dyn ImageConverter>,
}

impl PlacementEngine {
    pub fn new(converter: Box<dyn ImageConverter>) -> Self {
        Self {
            registry: DedupRegistry::new(),
            dirs: DirectoryCache::new(),
            converter,
        }
    }

    /// Place `source` into `folder` with full deduplication.
    ///
    /// `convert` routes the file through the image converter and gives the
    /// output a `.jpg` extension. A `FileError::Hash` means the source
    /// could not be fingerprinted; the caller decides where it goes next.
    pub fn place(
        &self,
        source: &Path,
        folder: &Path,
        convert: bool,
    ) -> Result<Placement, FileError> {
        self.ensure_folder(source, folder)?;

        let fingerprint = file_fingerprint(source).map_err(|e| FileError::Hash {
            path: source.to_path_buf(),
            source: e,
        })?;

        if !self.registry.try_claim(folder, &fingerprint) {
            remove_source(source)?;
            return Ok(Placement::SameRunDuplicate);
        }

        self.place_at_free_slot(source, folder, Some(&fingerprint), convert)
    }

    /// Place without a fingerprint, after hashing already failed.
    ///
    /// No dedup is possible: occupied name slots always advance the
    /// disambiguator instead of comparing content.
    pub fn place_unverified(&self, source: &Path, folder: &Path) -> Result<Placement, FileError> {
        self.ensure_folder(source, folder)?;
        self.place_at_free_slot(source, folder, None, false)
    }

    fn ensure_folder(&self, source: &Path, folder: &Path) -> Result<(), FileError> {
        self.dirs.ensure(folder).map_err(|e| FileError::Placement {
            path: source.to_path_buf(),
            dest: folder.to_path_buf(),
            source: e,
        })
    }

    /// Probe candidate names until a free or duplicate slot is found.
    fn place_at_free_slot(
        &self,
        source: &Path,
        folder: &Path,
        fingerprint: Option<&str>,
        convert: bool,
    ) -> Result<Placement, FileError> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("file");
        let extension = if convert {
            Some("jpg".to_string())
        } else {
            source
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_string())
        };

        let join_name = |name: &str| -> PathBuf {
            match &extension {
                Some(ext) => folder.join(format!("{name}.{ext}")),
                None => folder.join(name),
            }
        };

        let mut candidate = join_name(stem);
        let mut counter = 1usize;

        loop {
            if !candidate.exists() {
                break;
            }

            if let Some(fp) = fingerprint {
                // An unreadable occupant is treated as different content
                if let Ok(existing_fp) = file_fingerprint(&candidate) {
                    if existing_fp == fp {
                        remove_source(source)?;
                        return Ok(Placement::ExistingDuplicate {
                            existing: candidate,
                        });
                    }
                }
            }

            candidate = join_name(&format!("{stem}_{counter}"));
            counter += 1;
        }

        if convert {
            self.converter
                .convert(source, &candidate)
                .map_err(|e| FileError::Placement {
                    path: source.to_path_buf(),
                    dest: candidate.clone(),
                    source: io::Error::new(io::ErrorKind::Other, e.to_string()),
                })?;
            if let Err(e) = fs::remove_file(source) {
                tracing::warn!(path = %source.display(), error = %e, "could not delete source after conversion");
            }
        } else {
            move_file(source, &candidate)?;
        }

        Ok(Placement::Placed {
            final_path: candidate,
            renamed: counter > 1,
            converted: convert,
        })
    }
}

/// Atomic rename with a verified copy fallback for cross-volume moves.
fn move_file(source: &Path, dest: &Path) -> Result<(), FileError> {
    fs::rename(source, dest)
        .or_else(|_| {
            // rename fails across filesystems, fall back to copy+delete
            // with size verification before deleting source
            let source_size = fs::metadata(source)?.len();
            fs::copy(source, dest)?;

            let dest_size = fs::metadata(dest)?.len();
            if dest_size != source_size {
                // Copy was incomplete, don't delete source
                let _ = fs::remove_file(dest);
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!(
                        "copy verification failed: source {} bytes, dest {} bytes",
                        source_size, dest_size
                    ),
                ));
            }

            fs::remove_file(source)
        })
        .map_err(|e| FileError::Placement {
            path: source.to_path_buf(),
            dest: dest.to_path_buf(),
            source: e,
        })
}

fn remove_source(source: &Path) -> Result<(), FileError> {
    fs::remove_file(source).map_err(|e| FileError::Access {
        path: source.to_path_buf(),
        source: e,
    })
}
