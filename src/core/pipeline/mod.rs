//! The sorting pipeline: source-tree walk, worker pool, per-file routing.
//!
//! One walking thread feeds a bounded queue; N workers drain it, each
//! running classify → date-resolve → place for its file. The bounded queue
//! is the only flow control: when workers fall behind, the walk blocks.

mod counters;

pub use counters::{Counters, CountersSnapshot};

use crossbeam_channel::{bounded, Sender};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::thread;
use walkdir::WalkDir;

use crate::core::archive;
use crate::core::classify::{self, MediaCategory};
use crate::core::cleanup;
use crate::core::convert::{ImageConverter, PassthroughConverter};
use crate::core::date::{self, DateOutcome};
use crate::core::placement::{Placement, PlacementEngine};
use crate::error::{FileError, WalkError};
use crate::events::{
    null_sender, DeleteReason, DuplicateKind, Event, EventSender, FileEvent, PipelineEvent,
    WalkEvent,
};
use crate::{Result, SorterError};

const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Configuration for one sorting run
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SortConfig {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// Worker thread count; sized for I/O-bound work, not CPU count
    pub workers: usize,
    /// Bounded task-queue capacity; the walk blocks when it is full
    pub queue_capacity: usize,
}

impl SortConfig {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            workers: default_workers(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// I/O-bound default: twice the available cores, at least 4
fn default_workers() -> usize {
    let cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(2);
    (cores * 2).max(4)
}

/// The four fundamental destination directories, created at startup
struct DestLayout {
    root: PathBuf,
    no_date: PathBuf,
    archives: PathBuf,
    errors: PathBuf,
}

/// Drives a full sorting run
pub struct Sorter {
    config: SortConfig,
    source: PathBuf,
    layout: DestLayout,
    engine: PlacementEngine,
    counters: Counters,
    events: EventSender,
}

impl Sorter {
    /// Validate the fatal preconditions and build a sorter.
    ///
    /// Fails if the source root does not exist or any fundamental
    /// destination directory cannot be created; everything after this
    /// point is per-file error handling.
    pub fn new(config: SortConfig) -> Result<Self> {
        if !config.source.is_dir() {
            return Err(SorterError::SourceMissing {
                path: config.source.clone(),
            });
        }

        for dir in [
            config.dest.clone(),
            config.dest.join("no_date"),
            config.dest.join("archives"),
            config.dest.join("errors"),
        ] {
            fs::create_dir_all(&dir).map_err(|e| SorterError::DestinationUnavailable {
                path: dir.clone(),
                source: e,
            })?;
        }

        // Canonical forms make the dest-prefix skip check reliable even
        // when source and dest are given as relative paths
        let source = fs::canonicalize(&config.source).map_err(|_| SorterError::SourceMissing {
            path: config.source.clone(),
        })?;
        let root =
            fs::canonicalize(&config.dest).map_err(|e| SorterError::DestinationUnavailable {
                path: config.dest.clone(),
                source: e,
            })?;
        let layout = DestLayout {
            no_date: root.join("no_date"),
            archives: root.join("archives"),
            errors: root.join("errors"),
            root,
        };

        Ok(Self {
            config,
            source,
            layout,
            engine: PlacementEngine::new(Box::new(PassthroughConverter)),
            counters: Counters::new(),
            events: null_sender(),
        })
    }

    /// Subscribe a UI to progress events
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Replace the placeholder image converter
    pub fn with_converter(mut self, converter: Box<dyn ImageConverter>) -> Self {
        self.engine = PlacementEngine::new(converter);
        self
    }

    /// Walk the source tree, process every file, then sweep empty
    /// directories. Returns the final counters snapshot.
    pub fn run(&self) -> Result<CountersSnapshot> {
        self.events.send(Event::Pipeline(PipelineEvent::Started));
        self.events.send(Event::Walk(WalkEvent::Started {
            root: self.source.clone(),
        }));

        let (tx, rx) = bounded::<PathBuf>(self.config.queue_capacity);

        thread::scope(|scope| {
            for _ in 0..self.config.workers.max(1) {
                let rx = rx.clone();
                scope.spawn(move || {
                    for path in rx.iter() {
                        self.process_file(&path);
                        self.counters
                            .files_processed
                            .fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
            self.walk_and_dispatch(tx);
        });

        cleanup::remove_empty_dirs(&self.source);

        let snapshot = self.counters.snapshot();
        self.events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: snapshot.clone(),
        }));
        Ok(snapshot)
    }

    /// Enumerate regular files and feed the queue; blocking on a full
    /// queue is the pipeline's backpressure.
    fn walk_and_dispatch(&self, tx: Sender<PathBuf>) {
        for entry in WalkDir::new(&self.source) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        WalkError::PermissionDenied { path: path.clone() }
                    } else {
                        WalkError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                        }
                    };
                    tracing::warn!(error = %error, "error walking source tree");
                    self.events.send(Event::Walk(WalkEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();

            // Never re-ingest our own output when the trees overlap
            if path.starts_with(&self.layout.root) {
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            self.counters.files_found.fetch_add(1, Ordering::Relaxed);
            if tx.send(path).is_err() {
                break;
            }
        }

        self.events.send(Event::Walk(WalkEvent::Completed {
            files_found: self.counters.files_found.load(Ordering::Relaxed),
        }));
        // Dropping the sender closes the queue; workers drain and exit
    }

    /// Classify one file and route it. Also the re-entry point for files
    /// pulled out of archives.
    fn process_file(&self, path: &Path) {
        match MediaCategory::from_path(path) {
            MediaCategory::Other => self.delete_non_media(path),
            MediaCategory::Archive => self.handle_archive(path),
            category => self.process_media(path, category),
        }
    }

    fn process_media(&self, path: &Path, category: MediaCategory) {
        let (folder, dated) = match date::resolve_year(path, category) {
            DateOutcome::Year(year) => (self.layout.root.join(year.to_string()), true),
            DateOutcome::NoDate => {
                self.counters.no_date.fetch_add(1, Ordering::Relaxed);
                (
                    self.layout.no_date.join(classify::no_date_bucket(path)),
                    false,
                )
            }
            DateOutcome::AccessError => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                self.events.send(Event::File(FileEvent::Error {
                    path: path.to_path_buf(),
                    kind: "access-error".to_string(),
                }));
                (self.layout.errors.clone(), false)
            }
        };

        let convert = category == MediaCategory::Image && classify::is_heic(path);
        self.place_into(path, &folder, convert, category, dated);
    }

    /// Place a file and translate the outcome into tallies and events.
    fn place_into(
        &self,
        path: &Path,
        folder: &Path,
        convert: bool,
        category: MediaCategory,
        dated: bool,
    ) {
        match self.engine.place(path, folder, convert) {
            Ok(placement) => self.tally_placement(path, placement, category, dated),
            Err(FileError::Hash { path: p, source }) => {
                tracing::warn!(path = %p.display(), error = %source, "could not fingerprint; routing to errors folder");
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                self.events.send(Event::File(FileEvent::Error {
                    path: p.clone(),
                    kind: "hash-error".to_string(),
                }));
                match self.engine.place_unverified(&p, &self.layout.errors) {
                    Ok(placement) => self.tally_placement(&p, placement, category, false),
                    Err(e) => self.tally_file_error(e),
                }
            }
            Err(e) => self.tally_file_error(e),
        }
    }

    fn tally_placement(
        &self,
        path: &Path,
        placement: Placement,
        category: MediaCategory,
        dated: bool,
    ) {
        match placement {
            Placement::Placed {
                final_path,
                renamed,
                converted,
            } => {
                if renamed {
                    let new_name = final_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.events.send(Event::File(FileEvent::Renamed {
                        path: path.to_path_buf(),
                        new_name,
                    }));
                }
                if converted {
                    self.counters.converted.fetch_add(1, Ordering::Relaxed);
                }
                if dated {
                    match category {
                        MediaCategory::Image => {
                            self.counters.images_placed.fetch_add(1, Ordering::Relaxed);
                        }
                        MediaCategory::Video => {
                            self.counters.videos_placed.fetch_add(1, Ordering::Relaxed);
                        }
                        _ => {}
                    }
                }
                self.events.send(Event::File(FileEvent::Placed {
                    path: path.to_path_buf(),
                    final_path,
                    category,
                }));
            }
            Placement::SameRunDuplicate => {
                self.counters
                    .duplicates_deleted
                    .fetch_add(1, Ordering::Relaxed);
                self.events.send(Event::File(FileEvent::Duplicate {
                    path: path.to_path_buf(),
                    kind: DuplicateKind::SameRun,
                }));
            }
            Placement::ExistingDuplicate { .. } => {
                self.counters
                    .duplicates_deleted
                    .fetch_add(1, Ordering::Relaxed);
                self.events.send(Event::File(FileEvent::Duplicate {
                    path: path.to_path_buf(),
                    kind: DuplicateKind::PreExisting,
                }));
            }
        }
    }

    fn tally_file_error(&self, error: FileError) {
        let (path, kind) = match &error {
            FileError::Access { path, .. } => (path.clone(), "access-error"),
            FileError::Hash { path, .. } => (path.clone(), "hash-error"),
            FileError::Placement { path, .. } => (path.clone(), "placement-error"),
        };
        tracing::warn!(path = %path.display(), error = %error, "file processing failed");
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
        self.events.send(Event::File(FileEvent::Error {
            path,
            kind: kind.to_string(),
        }));
    }

    /// Expand an archive and feed its contents back through the pipeline;
    /// on failure the archive itself is routed to the archives folder.
    fn handle_archive(&self, path: &Path) {
        match archive::expand(path) {
            Ok(scratch) => {
                for entry in WalkDir::new(&scratch).into_iter().filter_map(|e| e.ok()) {
                    if entry.file_type().is_file() {
                        self.process_file(entry.path());
                    }
                }
                if let Err(e) = fs::remove_dir_all(&scratch) {
                    tracing::warn!(path = %scratch.display(), error = %e, "could not remove extraction scratch dir");
                }

                self.counters
                    .archives_extracted
                    .fetch_add(1, Ordering::Relaxed);
                match fs::remove_file(path) {
                    Ok(()) => self.events.send(Event::File(FileEvent::Deleted {
                        path: path.to_path_buf(),
                        reason: DeleteReason::ArchiveExtracted,
                    })),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "could not delete archive after extraction");
                    }
                }
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "archive not expanded; moving whole");
                self.counters.archives_moved.fetch_add(1, Ordering::Relaxed);
                let archives = self.layout.archives.clone();
                self.place_into(path, &archives, false, MediaCategory::Archive, false);
            }
        }
    }

    fn delete_non_media(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => {
                self.counters
                    .non_media_deleted
                    .fetch_add(1, Ordering::Relaxed);
                self.events.send(Event::File(FileEvent::Deleted {
                    path: path.to_path_buf(),
                    reason: DeleteReason::NonMedia,
                }));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not delete non-media file");
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                self.events.send(Event::File(FileEvent::Error {
                    path: path.to_path_buf(),
                    kind: "delete-failed".to_string(),
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_source_is_fatal() {
        let dest = TempDir::new().unwrap();
        let config = SortConfig::new("/nonexistent/source/tree", dest.path());

        let result = Sorter::new(config);
        assert!(matches!(result, Err(SorterError::SourceMissing { .. })));
    }

    #[test]
    fn new_creates_fundamental_destination_dirs() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let dest_root = dest.path().join("sorted");

        Sorter::new(SortConfig::new(source.path(), &dest_root)).unwrap();

        assert!(dest_root.join("no_date").is_dir());
        assert!(dest_root.join("archives").is_dir());
        assert!(dest_root.join("errors").is_dir());
    }

    #[test]
    fn default_workers_has_a_floor_of_four() {
        assert!(default_workers() >= 4);
    }

    #[test]
    fn empty_source_yields_all_zero_snapshot() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let sorter = Sorter::new(SortConfig::new(source.path(), dest.path())).unwrap();
        let snapshot = sorter.run().unwrap();

        assert_eq!(snapshot, CountersSnapshot::default());
    }
}
