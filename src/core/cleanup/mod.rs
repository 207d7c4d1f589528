//! Empty-directory removal after the run.
//!
//! Removing a leaf can make its parent newly empty, so the sweep repeats
//! full passes until one removes nothing. The root itself is never removed.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Remove empty directories under `root` until a fixed point is reached.
///
/// Returns how many directories were removed in total.
pub fn remove_empty_dirs(root: &Path) -> usize {
    let mut total = 0;
    loop {
        let removed = single_pass(root);
        if removed == 0 {
            break;
        }
        total += removed;
    }
    total
}

fn single_pass(root: &Path) -> usize {
    let mut removed = 0;

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry during cleanup");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        if is_empty(entry.path()) && fs::remove_dir(entry.path()).is_ok() {
            removed += 1;
        }
    }

    removed
}

/// An unreadable directory is treated as non-empty and left alone.
fn is_empty(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_nested_chain_in_one_call() {
        let root = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("a/b/c")).unwrap();

        let removed = remove_empty_dirs(root.path());

        assert_eq!(removed, 3);
        assert!(!root.path().join("a").exists());
        assert!(root.path().exists());
    }

    #[test]
    fn keeps_directories_holding_files() {
        let root = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("keep/empty")).unwrap();
        fs::write(root.path().join("keep/file.txt"), b"data").unwrap();

        let removed = remove_empty_dirs(root.path());

        assert_eq!(removed, 1);
        assert!(root.path().join("keep").exists());
        assert!(!root.path().join("keep/empty").exists());
    }

    #[test]
    fn second_run_is_a_no_op() {
        let root = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("x/y")).unwrap();

        remove_empty_dirs(root.path());
        assert_eq!(remove_empty_dirs(root.path()), 0);
    }
}
