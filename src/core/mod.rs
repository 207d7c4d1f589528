//! # Core Module
//!
//! The GUI-agnostic classification-and-placement engine.
//!
//! ## Modules
//! - `classify` - Maps files to media categories and no-date buckets
//! - `date` - Extracts embedded capture dates (EXIF, MP4 atoms, RIFF chunks)
//! - `fingerprint` - Streams content hashes for deduplication
//! - `registry` - Per-run deduplication registry and directory cache
//! - `convert` - Image format conversion boundary (HEIC placeholder)
//! - `placement` - Collision-resolved move/copy into destination folders
//! - `archive` - ZIP expansion into a scratch tree
//! - `cleanup` - Empty-directory removal after the run
//! - `pipeline` - Walks the source tree and drives the worker pool

pub mod archive;
pub mod classify;
pub mod cleanup;
pub mod convert;
pub mod date;
pub mod fingerprint;
pub mod placement;
pub mod pipeline;
pub mod registry;

// Re-export commonly used types
pub use classify::MediaCategory;
pub use pipeline::{CountersSnapshot, SortConfig, Sorter};
pub use placement::{Placement, PlacementEngine};
pub use registry::{DedupRegistry, DirectoryCache};
