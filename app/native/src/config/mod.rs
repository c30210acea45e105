//! Configuration module for mwm.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//!
//! There is no global configuration instance: callers load a [`MwmConfig`]
//! once and hand the relevant sections to the components that need them.

pub mod types;

use std::path::{Path, PathBuf};

pub use types::{
    ConfigError, LayoutSection, MigrationSection, MwmConfig, WorkspacesSection, config_paths, load_config,
    load_config_from_path,
};

/// A loaded configuration and the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// The configuration.
    pub config: MwmConfig,
    /// Source file, or `None` when running on defaults.
    pub path: Option<PathBuf>,
}

/// Loads the configuration.
///
/// With `custom` set, only that file is read and a missing file is an error.
/// Otherwise the search paths are tried and a missing file yields defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file exists but cannot be read or parsed, or
/// if an explicitly requested file is missing.
pub fn load(custom: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let result = custom.map_or_else(load_config, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(LoadedConfig { config, path: Some(path) })
        }
        Err(ConfigError::NotFound) if custom.is_none() => {
            tracing::debug!("no configuration file found, using defaults");
            Ok(LoadedConfig::default())
        }
        Err(err) => Err(err),
    }
}
