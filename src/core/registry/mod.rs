//! Shared, internally-synchronized services injected into workers.
//!
//! Both structures are per-run state: they start empty and die with the
//! process. Nothing here persists across runs.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// Per-destination-folder record of content fingerprints placed this run.
///
/// The check-then-insert must be one critical section: two workers holding
/// identical content for the same folder must not both observe "absent".
#[derive(Default)]
pub struct DedupRegistry {
    inner: Mutex<HashMap<PathBuf, HashSet<String>>>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim a fingerprint for a folder.
    ///
    /// Returns `true` if this caller is the first to place this content in
    /// this folder during the run; `false` means an identical file was
    /// already placed there and the caller holds a duplicate.
    pub fn try_claim(&self, folder: &Path, fingerprint: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner
            .entry(folder.to_path_buf())
            .or_default()
            .insert(fingerprint.to_string())
    }
}

/// Memoized "ensure this directory exists".
///
/// Purely an optimization: a cache miss costs one redundant
/// `create_dir_all`, never a wrong result.
#[derive(Default)]
pub struct DirectoryCache {
    created: RwLock<HashSet<PathBuf>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure(&self, dir: &Path) -> io::Result<()> {
        if self.created.read().unwrap().contains(dir) {
            return Ok(());
        }

        let mut created = self.created.write().unwrap();
        // Another worker may have created it between the locks
        if created.contains(dir) {
            return Ok(());
        }

        std::fs::create_dir_all(dir)?;
        created.insert(dir.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn first_claim_wins_subsequent_claims_lose() {
        let registry = DedupRegistry::new();
        let folder = Path::new("/dest/2021");

        assert!(registry.try_claim(folder, "abc123"));
        assert!(!registry.try_claim(folder, "abc123"));
    }

    #[test]
    fn claims_are_scoped_per_folder() {
        let registry = DedupRegistry::new();

        assert!(registry.try_claim(Path::new("/dest/2021"), "abc123"));
        assert!(registry.try_claim(Path::new("/dest/2022"), "abc123"));
    }

    #[test]
    fn concurrent_claims_admit_exactly_one_winner() {
        let registry = Arc::new(DedupRegistry::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                registry.try_claim(Path::new("/dest/2021"), "contested")
            }));
        }

        let winners: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }

    #[test]
    fn ensure_creates_nested_directories_once() {
        let root = tempfile::TempDir::new().unwrap();
        let cache = DirectoryCache::new();
        let target = root.path().join("2021").join("deep");

        cache.ensure(&target).unwrap();
        assert!(target.is_dir());

        // Second call is a cache hit and must not fail
        cache.ensure(&target).unwrap();
    }

    #[test]
    fn ensure_is_safe_under_concurrency() {
        let root = tempfile::TempDir::new().unwrap();
        let cache = Arc::new(DirectoryCache::new());
        let target = root.path().join("shared");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let target = target.clone();
                thread::spawn(move || cache.ensure(&target).unwrap())
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(target.is_dir());
    }
}
