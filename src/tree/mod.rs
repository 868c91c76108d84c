//! Filesystem Tree
//!
//! Directory listing, path helpers, node classification and structural hashing.
//! Everything here is synchronous and free of provider or store concerns.

pub mod classify;
pub mod hasher;
pub mod node;
pub mod path;
pub mod walker;

pub use classify::{classify, MIN_TEXT_FILES};
pub use hasher::compute_structural_hash;
pub use node::{DirectoryListing, FileEntry};
pub use walker::{list_directory, WalkerConfig};
