//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::MapMakerConfig;
use crate::error::ApiError;
use std::path::Path;

/// File name of the optional root-local configuration
pub const WORKSPACE_CONFIG_FILE: &str = ".mapmaker.toml";

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the tree rooted at `root` from files and environment.
    pub fn load(root: &Path) -> Result<MapMakerConfig, ApiError> {
        let config = MergeService::load(root)?;
        config.validate().map_err(ApiError::ConfigError)?;
        Ok(config)
    }

    /// Load configuration from a specific file, skipping the global and root-local files.
    pub fn load_from_file(path: &Path) -> Result<MapMakerConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = MergeService::load_from_file(path)?;
        config.validate().map_err(ApiError::ConfigError)?;
        Ok(config)
    }

    /// Load from `explicit` when given, otherwise from the standard layers for `root`.
    pub fn resolve(explicit: Option<&Path>, root: &Path) -> Result<MapMakerConfig, ApiError> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => Self::load(root),
        }
    }

    /// Create default configuration.
    pub fn default() -> MapMakerConfig {
        MapMakerConfig::default()
    }

    /// Default configuration rendered as commented TOML
    pub fn default_toml() -> Result<String, ApiError> {
        let body = toml::to_string_pretty(&MapMakerConfig::default())
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))?;
        Ok(format!(
            "# mapmaker configuration\n\
             #\n\
             # Load order: built-in defaults, $XDG_CONFIG_HOME/mapmaker/config.toml,\n\
             # <root>/{}, then MAPMAKER__SECTION__KEY environment variables.\n\n{}",
            WORKSPACE_CONFIG_FILE, body
        ))
    }

    /// Write the default configuration to `path`; refuses to overwrite unless `force`
    pub fn write_default(path: &Path, force: bool) -> Result<(), ApiError> {
        if path.exists() && !force {
            return Err(ApiError::ConfigError(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_toml()?)?;
        Ok(())
    }
}
