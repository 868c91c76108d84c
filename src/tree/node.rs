//! Directory listing types

use std::path::PathBuf;
use std::time::SystemTime;

/// A direct file of a folder, with the metadata the structural hash depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// NFC-normalized file name
    pub name: String,
    pub modified: SystemTime,
}

impl FileEntry {
    pub fn new(path: PathBuf, name: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            path,
            name: name.into(),
            modified,
        }
    }
}

/// Immediate contents of one directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    /// Subdirectories to descend into, sorted by name
    pub subdirectories: Vec<PathBuf>,
    /// Direct files, sorted by name
    pub files: Vec<FileEntry>,
    /// Entries that could not be inspected
    pub errors: Vec<String>,
}
