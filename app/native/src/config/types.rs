//! Configuration types for mwm.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//!
//! The file is only ever read. Nothing in mwm writes configuration back.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tiling::constants::{layout, migration, workspace};
use crate::tiling::layout::LayoutConfig;
use crate::tiling::migration::MigrationTiming;

// ============================================================================
// Sections
// ============================================================================

/// Master/stack layout settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSection {
    /// Gap between the master and the stack and between stack windows, in pixels.
    pub gaps: u32,
    /// Inset from the screen edges, in pixels.
    pub padding: u32,
    /// Fraction of the width given to the master window.
    /// Values outside 0.1-0.9 are clamped.
    pub master_ratio: f64,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            gaps: layout::DEFAULT_GAPS,
            padding: layout::DEFAULT_PADDING,
            master_ratio: layout::DEFAULT_MASTER_RATIO,
        }
    }
}

impl LayoutSection {
    /// Converts the section into a clamped [`LayoutConfig`].
    #[must_use]
    pub fn to_layout_config(&self) -> LayoutConfig { LayoutConfig::new(self.gaps, self.padding, self.master_ratio) }
}

/// Space enumeration settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkspacesSection {
    /// How long a space enumeration is reused before refreshing, in milliseconds.
    pub cache_ttl_ms: u64,
}

impl Default for WorkspacesSection {
    fn default() -> Self { Self { cache_ttl_ms: workspace::CACHE_TTL_MS } }
}

impl WorkspacesSection {
    /// Returns the cache TTL.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration { Duration::from_millis(self.cache_ttl_ms) }
}

/// Window migration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MigrationSection {
    /// Delay between grabbing the window and pressing the switch shortcut, in milliseconds.
    pub grab_delay_ms: u64,
    /// Delay between the switch shortcut and releasing the window, in milliseconds.
    pub release_delay_ms: u64,
    /// Horizontal offset of the grab point from the window's left edge.
    pub grab_offset_x: f64,
    /// Vertical offset of the grab point from the window's top edge.
    pub grab_offset_y: f64,
    /// Disable a switch shortcut again if it had to be enabled for a migration.
    pub restore_shortcut_state: bool,
}

impl Default for MigrationSection {
    fn default() -> Self {
        Self {
            grab_delay_ms: migration::GRAB_DELAY_MS,
            release_delay_ms: migration::RELEASE_DELAY_MS,
            grab_offset_x: migration::GRAB_OFFSET_X,
            grab_offset_y: migration::GRAB_OFFSET_Y,
            restore_shortcut_state: true,
        }
    }
}

impl MigrationSection {
    /// Converts the section into protocol timing.
    #[must_use]
    pub const fn timing(&self) -> MigrationTiming {
        MigrationTiming {
            grab_delay: Duration::from_millis(self.grab_delay_ms),
            release_delay: Duration::from_millis(self.release_delay_ms),
            grab_offset: (self.grab_offset_x, self.grab_offset_y),
        }
    }
}

/// Root configuration structure.
///
/// # Example
///
/// ```jsonc
/// {
///   "layout": { "gaps": 8, "padding": 12, "masterRatio": 0.6 },
///   "workspaces": { "cacheTtlMs": 5000 },
///   "migration": { "grabDelayMs": 50, "releaseDelayMs": 400 },
///   "keybindings": {
///     // Unbind the default retile shortcut
///     "Option+R": "",
///     "Ctrl+Alt+Return": "promote"
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MwmConfig {
    /// JSON schema reference, ignored when loading.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Layout settings.
    pub layout: LayoutSection,

    /// Space enumeration settings.
    pub workspaces: WorkspacesSection,

    /// Window migration settings.
    pub migration: MigrationSection,

    /// Keybinding overrides, merged over the built-in bindings.
    ///
    /// The key is a shortcut string such as `"Option+Shift+H"`; the value is
    /// an action name such as `"move-left"`, `"switch-to-space-2"` or
    /// `"increase-master-ratio"`. An empty string removes the binding.
    pub keybindings: HashMap<String, String>,
}

// ============================================================================
// Loading
// ============================================================================

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/mwm/config.jsonc, the platform \
         config directory, or ~/.mwm.jsonc"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Home directory configuration file names.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".mwm.jsonc", ".mwm.json"];

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/mwm/config.jsonc` or `config.json` (if set)
/// 2. `~/.config/mwm/config.jsonc` or `config.json`
/// 3. `<platform config dir>/mwm/config.jsonc` or `config.json`
/// 4. `~/.mwm.jsonc` or `~/.mwm.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    config_paths_from(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        dirs::home_dir(),
        dirs::config_dir(),
    )
}

fn config_paths_from(xdg: Option<PathBuf>, home: Option<PathBuf>, config_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Some(xdg) = xdg {
        push_dir(xdg.join("mwm"));
    }
    if let Some(home) = &home {
        push_dir(home.join(".config").join("mwm"));
    }
    if let Some(config_dir) = config_dir {
        push_dir(config_dir.join("mwm"));
    }

    if let Some(home) = home {
        for filename in HOME_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::Io` if a configuration file exists but could not be read.
/// Returns `ConfigError::Parse` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(MwmConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .ok_or(ConfigError::NotFound)
        .and_then(|path| load_config_from_path(&path))
}

/// Loads the configuration from a specific path.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist.
/// Returns `ConfigError::Io` if the file could not be read.
/// Returns `ConfigError::Parse` if the file contains invalid JSON.
pub fn load_config_from_path(path: &Path) -> Result<(MwmConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: MwmConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = MwmConfig::default();
        assert!(config.keybindings.is_empty());
        assert_eq!(config.layout.gaps, 10);
        assert_eq!(config.workspaces.cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.migration.timing(), MigrationTiming::default());
        assert!(config.migration.restore_shortcut_state);
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let json = r#"{ "layout": { "masterRatio": 0.7 }, "migration": { "releaseDelayMs": 600 } }"#;
        let config: MwmConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.layout.padding, 10);
        assert!((config.layout.master_ratio - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.migration.grab_delay_ms, 50);
        assert_eq!(config.migration.timing().release_delay, Duration::from_millis(600));
    }

    #[test]
    fn test_layout_section_clamps_ratio() {
        let section = LayoutSection { gaps: 0, padding: 0, master_ratio: 2.0 };
        assert!((section.to_layout_config().master_ratio() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_jsonc_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                // line comment
                "layout": {{ "gaps": 4 /* inline */ }},
                "keybindings": {{ "Ctrl+Alt+M": "promote" }}
            }}"#
        )
        .unwrap();

        let (config, path) = load_config_from_path(file.path()).unwrap();
        assert_eq!(path, file.path());
        assert_eq!(config.layout.gaps, 4);
        assert_eq!(config.keybindings.get("Ctrl+Alt+M").map(String::as_str), Some("promote"));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from_path(&dir.path().join("nope.jsonc"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"layout\": ").unwrap();
        let result = load_config_from_path(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_paths_order() {
        let paths = config_paths_from(
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/u")),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/xdg/mwm/config.jsonc"),
                PathBuf::from("/xdg/mwm/config.json"),
                PathBuf::from("/home/u/.config/mwm/config.jsonc"),
                PathBuf::from("/home/u/.config/mwm/config.json"),
                PathBuf::from("/home/u/.mwm.jsonc"),
                PathBuf::from("/home/u/.mwm.json"),
            ]
        );
    }

    #[test]
    fn test_config_error_display() {
        assert!(ConfigError::NotFound.to_string().contains("No configuration file found"));
    }
}
