//! Atomic operation tallies for the run.
//!
//! Each counter is incremented independently with relaxed ordering; no
//! cross-counter ordering is guaranteed or needed. They reset only with
//! the process.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Counters {
    pub images_placed: AtomicU64,
    pub videos_placed: AtomicU64,
    pub converted: AtomicU64,
    pub no_date: AtomicU64,
    pub archives_extracted: AtomicU64,
    pub archives_moved: AtomicU64,
    pub non_media_deleted: AtomicU64,
    pub duplicates_deleted: AtomicU64,
    pub errors: AtomicU64,
    pub skipped: AtomicU64,
    pub files_found: AtomicU64,
    pub files_processed: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            images_placed: self.images_placed.load(Ordering::Relaxed),
            videos_placed: self.videos_placed.load(Ordering::Relaxed),
            converted: self.converted.load(Ordering::Relaxed),
            no_date: self.no_date.load(Ordering::Relaxed),
            archives_extracted: self.archives_extracted.load(Ordering::Relaxed),
            archives_moved: self.archives_moved.load(Ordering::Relaxed),
            non_media_deleted: self.non_media_deleted.load(Ordering::Relaxed),
            duplicates_deleted: self.duplicates_deleted.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            files_found: self.files_found.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters, handed to the reporter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersSnapshot {
    pub images_placed: u64,
    pub videos_placed: u64,
    pub converted: u64,
    pub no_date: u64,
    pub archives_extracted: u64,
    pub archives_moved: u64,
    pub non_media_deleted: u64,
    pub duplicates_deleted: u64,
    pub errors: u64,
    pub skipped: u64,
    pub files_found: u64,
    pub files_processed: u64,
}

impl CountersSnapshot {
    /// Placements plus deliberate deletions; the run's useful work
    pub fn successful_operations(&self) -> u64 {
        self.images_placed
            + self.videos_placed
            + self.converted
            + self.no_date
            + self.archives_extracted
            + self.archives_moved
            + self.non_media_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn snapshot_reflects_increments() {
        let counters = Counters::new();
        counters.images_placed.fetch_add(3, Ordering::Relaxed);
        counters.errors.fetch_add(1, Ordering::Relaxed);

        let snap = counters.snapshot();
        assert_eq!(snap.images_placed, 3);
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.videos_placed, 0);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let counters = Counters::new();
        counters.duplicates_deleted.fetch_add(2, Ordering::Relaxed);

        let snap = counters.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: CountersSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
