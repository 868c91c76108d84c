//! Shared traversal state for concurrent sibling processing
//!
//! Sibling folders may be processed concurrently, so the set of real paths
//! already visited in a run is shared behind a lock. Lookups and inserts are
//! single critical sections; no guard is ever held across an await point.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Real (canonical) paths visited during one traversal
#[derive(Debug, Default)]
pub struct VisitedPaths {
    paths: Mutex<HashSet<PathBuf>>,
}

impl VisitedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`; returns false when it was already visited
    pub fn insert(&self, path: PathBuf) -> bool {
        self.paths.lock().insert(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }

    /// Forget everything; called at the start of each run
    pub fn clear(&self) {
        self.paths.lock().clear();
    }
}
