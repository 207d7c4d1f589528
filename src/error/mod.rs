//! # Error Module
//!
//! Error types for the media sorter.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Per-file errors never stop the run** - only a missing source root or
//!   an uncreatable destination is fatal
//! - **Unparseable metadata is not an error** - a malformed MP4 box or a
//!   missing EXIF block simply means "no date"; errors are reserved for
//!   files that cannot be read at all

use std::path::PathBuf;
use thiserror::Error;

/// Fatal, run-level errors. Anything not covered here is handled per file.
#[derive(Error, Debug)]
pub enum SorterError {
    #[error("Source directory not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Failed to create destination directory {path}: {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors scoped to a single file's processing.
///
/// The placement engine returns these; the pipeline tallies them and moves
/// on to the next task.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("File vanished or unreadable: {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fingerprint {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to place {path} at {dest}: {source}")]
    Placement {
        path: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors encountered while walking the source tree.
///
/// These are logged and skipped; the walk always continues.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SorterError>;
