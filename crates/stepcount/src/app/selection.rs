//! Checked-folder selection state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Tracks which scanned folders are checked for counting.
///
/// An explicit component instance owns the checked set; it is constructed at
/// startup and dropped with the process. Toggling affects only the toggled
/// folder: checking a directory does not cascade to its children or parents,
/// and overlapping selections are left as-is for the count run.
#[derive(Debug, Default, Clone)]
pub struct Selector {
    checked: BTreeSet<PathBuf>,
}

impl Selector {
    /// Create an empty selector; every folder starts unchecked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checked folders.
    pub fn len(&self) -> usize {
        self.checked.len()
    }

    /// Whether nothing is checked.
    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    /// Flip the checked state for `path`, returning the new state.
    pub fn toggle(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.checked.remove(&path) {
            false
        } else {
            self.checked.insert(path);
            true
        }
    }

    /// Whether `path` is currently checked.
    pub fn is_checked(&self, path: &Path) -> bool {
        self.checked.contains(path)
    }

    /// Uncheck everything.
    pub fn clear(&mut self) {
        self.checked.clear();
    }

    /// Checked folders in sorted order.
    pub fn checked_paths(&self) -> Vec<PathBuf> {
        self.checked.iter().cloned().collect()
    }
}
