//! JSON Schema generation for the mwm configuration file.

use crate::config::MwmConfig;

/// Generates a JSON Schema for the mwm configuration.
///
/// The schema includes all configuration options with their types,
/// descriptions, and default values.
#[must_use]
pub fn generate_schema() -> schemars::Schema { schemars::schema_for!(MwmConfig) }

/// Generates a pretty-printed JSON Schema string for the mwm configuration.
///
/// Suitable for saving next to a config file and referencing through its
/// `$schema` key.
#[must_use]
pub fn generate_schema_json() -> String {
    let schema = generate_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
