//! Merge policy: built-in defaults form the lowest layer.

use crate::config::MapMakerConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder seeded with `MapMakerConfig::default()`.
///
/// Later sources override individual keys; arrays are replaced wholesale.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&MapMakerConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
