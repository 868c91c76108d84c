//! Structural hash computation for folders
//!
//! The structural hash is a content-addressed fingerprint of a folder's subtree:
//! it covers the `(name, mtime)` pair of every direct file and the `(name, hash)`
//! pair of every child folder. Because child hashes already cover their own
//! subtrees, any touch, add, remove or rename anywhere below a folder changes
//! that folder's hash and the hash of every ancestor. The folder's own location
//! is deliberately not an input.

use crate::tree::node::FileEntry;
use crate::tree::path::normalize_name;
use crate::types::Hash;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

const FILE_TAG: u8 = b'f';
const CHILD_TAG: u8 = b'c';

/// Compute the structural hash of a folder as lower-case hex
///
/// `children` holds `(child folder name, child structural hash)` pairs. Both
/// inputs are sorted by name before hashing, so traversal order is irrelevant.
pub fn compute_structural_hash(
    path: &Path,
    files: &[FileEntry],
    children: &[(String, String)],
) -> String {
    let mut file_entries: Vec<(String, String)> = files
        .iter()
        .map(|f| (normalize_name(&f.name), mtime_key(f.modified)))
        .collect();
    file_entries.sort();

    let mut child_entries: Vec<(String, String)> = children
        .iter()
        .map(|(name, hash)| (normalize_name(name), hash.clone()))
        .collect();
    child_entries.sort();

    let digest = digest_entries(&file_entries, &child_entries);
    let hex = hex::encode(digest);
    trace!(path = %path.display(), hash = %hex, "Computed structural hash");
    hex
}

/// Canonical encoding: tag byte, then length-prefixed name and value per entry
fn digest_entries(files: &[(String, String)], children: &[(String, String)]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(files.len() as u64).to_le_bytes());
    for (name, mtime) in files {
        update_entry(&mut hasher, FILE_TAG, name, mtime);
    }
    hasher.update(&(children.len() as u64).to_le_bytes());
    for (name, hash) in children {
        update_entry(&mut hasher, CHILD_TAG, name, hash);
    }
    *hasher.finalize().as_bytes()
}

fn update_entry(hasher: &mut blake3::Hasher, tag: u8, name: &str, value: &str) {
    hasher.update(&[tag]);
    hasher.update(&(name.len() as u64).to_le_bytes());
    hasher.update(name.as_bytes());
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Modification time as `seconds.nanoseconds` relative to the Unix epoch
fn mtime_key(modified: SystemTime) -> String {
    match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => format!("{}.{:09}", d.as_secs(), d.subsec_nanos()),
        Err(e) => {
            let d = e.duration();
            format!("-{}.{:09}", d.as_secs(), d.subsec_nanos())
        }
    }
}
