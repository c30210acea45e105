//! Error types for mwm.
//!
//! This module provides the top-level error returned by the CLI. Each layer
//! keeps its own typed error; they are flattened into [`MwmError`] at the
//! boundary so the result can be printed or serialized as JSON.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::tiling::{ActorError, MigrationError, TilingError};

/// Errors that can occur during application execution.
///
/// Serializes as `{"kind": ..., "message": ...}` for `--json` output.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum MwmError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Tiling operation failed.
    #[error("Tiling error: {0}")]
    TilingError(String),
    /// Window migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),
    /// The tiling actor could not be reached.
    #[error("Actor error: {0}")]
    ActorError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<ConfigError> for MwmError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<TilingError> for MwmError {
    fn from(err: TilingError) -> Self {
        match err {
            TilingError::Migration(inner) => inner.into(),
            other => Self::TilingError(other.to_string()),
        }
    }
}

impl From<MigrationError> for MwmError {
    fn from(err: MigrationError) -> Self { Self::MigrationError(err.to_string()) }
}

impl From<ActorError> for MwmError {
    fn from(err: ActorError) -> Self { Self::ActorError(err.to_string()) }
}

impl From<std::io::Error> for MwmError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for MwmError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<String> for MwmError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for MwmError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::{MigrationPhase, WindowId};

    #[test]
    fn test_invalid_arguments_display() {
        let err = MwmError::InvalidArguments("--windows must be positive".to_string());
        assert_eq!(err.to_string(), "--windows must be positive");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: MwmError = ConfigError::NotFound.into();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_tiling_error_conversion() {
        let err: MwmError = TilingError::WindowNotFound(WindowId::new(7)).into();
        let msg = err.to_string();
        assert!(msg.contains("Tiling error"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_wrapped_migration_error_is_unwrapped() {
        let err: MwmError = TilingError::Migration(MigrationError::Busy(MigrationPhase::Grabbing)).into();
        assert!(matches!(err, MwmError::MigrationError(_)));
    }

    #[test]
    fn test_actor_error_conversion() {
        let err: MwmError = ActorError::SendFailed.into();
        assert!(err.to_string().contains("Actor error"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: MwmError = io_err.into();
        assert!(matches!(err, MwmError::IoError(_)));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_serializes_with_kind_and_message() {
        let err = MwmError::ConfigError("bad".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "ConfigError");
        assert_eq!(json["message"], "bad");
    }
}
