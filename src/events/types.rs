//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::classify::MediaCategory;
use crate::core::pipeline::CountersSnapshot;

/// Top-level event emitted by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Walk(WalkEvent),
    File(FileEvent),
    Pipeline(PipelineEvent),
}

/// Events from the source-tree walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalkEvent {
    Started { root: PathBuf },
    /// A directory entry could not be read; the walk continues
    Error { path: PathBuf, message: String },
    Completed { files_found: u64 },
}

/// Why a source file was deleted without being placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteReason {
    /// Extension not in any recognized media set
    NonMedia,
    /// Archive removed after its contents were extracted and processed
    ArchiveExtracted,
}

/// Which kind of duplicate was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateKind {
    /// Fingerprint already recorded for this folder earlier in the run
    SameRun,
    /// A file with identical content already existed on disk
    PreExisting,
}

/// Per-file outcome events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FileEvent {
    Placed {
        path: PathBuf,
        final_path: PathBuf,
        category: MediaCategory,
    },
    /// Placement needed a numeric disambiguator
    Renamed { path: PathBuf, new_name: String },
    Duplicate { path: PathBuf, kind: DuplicateKind },
    Deleted { path: PathBuf, reason: DeleteReason },
    Error { path: PathBuf, kind: String },
}

/// Run lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Started,
    Completed { summary: CountersSnapshot },
}
