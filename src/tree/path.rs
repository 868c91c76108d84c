//! Path helpers for prompts and cycle detection

use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Resolve a path to its canonical, symlink-free form
pub fn canonicalize_path(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}

/// NFC-normalize a file or folder name
pub fn normalize_name(name: &str) -> String {
    name.nfc().collect()
}

/// Folder name used as a fallback label; the filesystem root has none
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| normalize_name(&n.to_string_lossy()))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Root".to_string())
}

/// Path segments of `path` relative to `root`; empty for the root itself
///
/// Returns `None` when `path` is not below `root`.
pub fn relative_segments(root: &Path, path: &Path) -> Option<Vec<String>> {
    let relative = path.strip_prefix(root).ok()?;
    Some(
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(normalize_name(&name.to_string_lossy())),
                _ => None,
            })
            .collect(),
    )
}

/// Every named component of an absolute path, for prompt readability
pub fn hierarchy(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(normalize_name(&name.to_string_lossy())),
            _ => None,
        })
        .collect()
}

/// Segments relative to the root joined with " > "
///
/// The root itself, or a path outside the root, falls back to its own segments.
pub fn build_path_context(root: &Path, path: &Path) -> String {
    let segments = match relative_segments(root, path) {
        Some(segments) if !segments.is_empty() => segments,
        Some(_) => return display_name(path),
        None => hierarchy(path),
    };
    segments.join(" > ")
}

/// First segment below the root, the key into the root rule table
pub fn first_segment(root: &Path, path: &Path) -> Option<String> {
    relative_segments(root, path)?.into_iter().next()
}
