//! # Media Sorter
//!
//! Sorts a tree of photos and videos into year folders chosen by the
//! capture date embedded in the file itself, never the filesystem dates.
//!
//! ## Core Philosophy
//! - **Metadata only** - EXIF "date taken" and container "media created"
//!   timestamps decide placement; mtime is ignored entirely
//! - **Forward progress** - per-file failures never stop the run; uncertain
//!   files land in an `errors` folder for manual review
//! - **No duplicates** - content-hash deduplication per destination folder
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - The classification-and-placement pipeline
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - Error types for the run and for individual files
//! - `cli` - Command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SorterError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
