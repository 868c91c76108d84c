//! Single-level directory enumeration

use crate::config::WORKSPACE_CONFIG_FILE;
use crate::tree::node::{DirectoryListing, FileEntry};
use crate::tree::path::normalize_name;
use crate::types::PERSONA_FILE_NAME;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Walker configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkerConfig {
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
}

/// List the immediate subdirectories and files of `path`
///
/// Fails only when the directory itself cannot be read. Individual entries that
/// cannot be inspected are reported in `DirectoryListing::errors`. Symlinked
/// directories are skipped unless `follow_symlinks` is set; symlinked files are
/// always treated as files. Exported persona files and mapmaker's own config
/// file are never listed, so writing either leaves the structural hash intact.
pub fn list_directory(path: &Path, config: &WalkerConfig) -> std::io::Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();

    for entry in fs::read_dir(path)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                listing
                    .errors
                    .push(format!("Failed to read entry in {}: {}", path.display(), e));
                continue;
            }
        };

        let entry_path = entry.path();
        let name = normalize_name(&entry.file_name().to_string_lossy());

        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                listing
                    .errors
                    .push(format!("Failed to inspect {}: {}", name, e));
                continue;
            }
        };

        // Resolve through the link so that dangling links are reported, not listed
        let metadata = if file_type.is_symlink() {
            match fs::metadata(&entry_path) {
                Ok(m) => m,
                Err(e) => {
                    listing
                        .errors
                        .push(format!("Broken symlink {}: {}", name, e));
                    continue;
                }
            }
        } else {
            match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    listing
                        .errors
                        .push(format!("Failed to stat {}: {}", name, e));
                    continue;
                }
            }
        };

        if metadata.is_dir() {
            if file_type.is_symlink() && !config.follow_symlinks {
                debug!(path = %entry_path.display(), "Skipping symlinked directory");
                continue;
            }
            listing.subdirectories.push(entry_path);
        } else if metadata.is_file() {
            if name == PERSONA_FILE_NAME || name == WORKSPACE_CONFIG_FILE {
                continue;
            }
            match metadata.modified() {
                Ok(modified) => listing.files.push(FileEntry::new(entry_path, name, modified)),
                Err(e) => listing
                    .errors
                    .push(format!("Failed to read modification time of {}: {}", name, e)),
            }
        }
    }

    listing.subdirectories.sort();
    listing.files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}
