//! Mapmaker: Hierarchical Folder Personas
//!
//! Walks a directory tree and gives every folder a persona: a short label, a
//! description, exclusions and example queries, derived bottom-up from file
//! samples and child personas and then refined top-down with parent context.
//! Personas are cached by structural hash so unchanged folders are never
//! regenerated.

pub mod builder;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod persona;
pub mod prompt;
pub mod provider;
pub mod sampler;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
