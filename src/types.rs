//! Core types shared across the traversal, store and CLI.

/// Hash: raw 256-bit structural digest
pub type Hash = [u8; 32];

/// Structural hash recorded for cycle placeholders instead of a digest
pub const SYMLINK_LOOP_HASH: &str = "symlink-loop";

/// File name used when exporting a persona next to its folder
///
/// Never counted as a direct file of the folder, so exports do not disturb the cache.
pub const PERSONA_FILE_NAME: &str = "folder_persona.json";
