//! Embedded capture-date extraction.
//!
//! Every parser here answers one question: what year was this media
//! created, according to the file's own metadata? Filesystem timestamps are
//! never consulted. Parsers distinguish "this file has no usable date"
//! (common, not an error) from "this file cannot be read" (routed to the
//! errors folder by the pipeline).

mod cursor;
pub mod exif;
pub mod mp4;
pub mod riff;

use chrono::Datelike;
use std::path::Path;

use super::classify::{extension_lower, MediaCategory};

/// Result of trying to resolve a capture year for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOutcome {
    /// A plausible 4-digit year from embedded metadata
    Year(i32),
    /// The file was readable but carried no usable date
    NoDate,
    /// The file itself could not be opened or read
    AccessError,
}

/// Resolve the capture year for a media file.
///
/// Images go through the EXIF reader; MP4-family and AVI videos through
/// their container parsers. Video formats without a supported parser
/// (wmv, mkv, ...) always resolve to no date.
pub fn resolve_year(path: &Path, category: MediaCategory) -> DateOutcome {
    match category {
        MediaCategory::Image => exif::capture_year(path),
        MediaCategory::Video => match extension_lower(path).as_deref() {
            Some("mp4" | "m4v" | "mov") => mp4::creation_year(path),
            Some("avi") => riff::creation_year(path),
            _ => DateOutcome::NoDate,
        },
        _ => DateOutcome::NoDate,
    }
}

/// Years outside `(1900, current + 1]` are treated as corruption.
pub(crate) fn plausible_year(year: i32) -> bool {
    year > 1900 && year <= chrono::Utc::now().year() + 1
}
