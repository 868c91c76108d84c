//! Tooling Layer
//!
//! Command-line surface over the persona builder and store, plus the text
//! renderers its commands share.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
