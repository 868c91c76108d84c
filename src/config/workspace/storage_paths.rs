//! StorageConfig and store path resolution.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const STORE_DIR: &str = "personas";

/// Storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persona store directory; relative paths resolve against the root.
    /// Unset means the per-root XDG data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the persona store location for the tree rooted at `root`.
    pub fn resolve_store_path(&self, root: &Path) -> Result<PathBuf, ApiError> {
        match &self.store_path {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => Ok(root.join(path)),
            None => Ok(xdg::workspace_data_dir(root)?.join(STORE_DIR)),
        }
    }
}
