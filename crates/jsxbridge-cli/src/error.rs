//! Error handling for the jsxbridge CLI.
//!
//! `CliError` is what commands return. Config problems carry a `ConfigError` with a hint
//! the user can act on; failures from the library arrive as [`jsxbridge::Error`] and keep
//! their diagnostic codes when rendered through miette.
//!
//! # Example
//!
//! ```rust,no_run
//! use jsxbridge_cli::error::{CliError, Result};
//! use std::path::Path;
//!
//! fn read_config(path: &Path) -> Result<String> {
//!     if !path.exists() {
//!         return Err(CliError::FileNotFound(path.to_path_buf()));
//!     }
//!     Ok(std::fs::read_to_string(path)?)
//! }
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration errors (missing file, bad syntax, invalid values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid command-line arguments or an operation the arguments do not allow
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors from the jsxbridge library
    #[error(transparent)]
    Core(#[from] jsxbridge::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error(
        "Cannot find config file in your project directory, expected it here: {}\n\nHint: Create a jsxbridge.config.json file or pass its path as an argument",
        .0.display()
    )]
    NotFound(PathBuf),

    /// Config file could not be parsed or has fields of the wrong type
    #[error("Invalid config file {}: {message}\n\nHint: Check jsxbridge.config.json syntax and field names", .path.display())]
    Invalid {
        /// Config file path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Mutually exclusive options were specified
    #[error("Conflicting options: {0}\n\nHint: These options cannot be used together")]
    ConflictingOptions(String),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("/p/jsxbridge.config.json"));
        let msg = err.to_string();
        assert!(msg.starts_with(
            "Cannot find config file in your project directory, expected it here: /p/jsxbridge.config.json"
        ));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let cli_err: CliError = ConfigError::NotFound(PathBuf::from("x.json")).into();
        assert!(matches!(cli_err, CliError::Config(_)));
    }

    #[test]
    fn test_cli_error_from_library_error() {
        let cli_err: CliError = jsxbridge::Error::Bundle("Unexpected token".to_string()).into();
        assert_eq!(cli_err.to_string(), "Bundle error: Unexpected token");
    }

    #[test]
    fn test_file_not_found_shows_path() {
        let err = CliError::FileNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "File not found: /missing/dir");
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "devConnectPort".to_string(),
            value: "0".to_string(),
            hint: "Use the port the companion extension listens on".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'devConnectPort'"));
        assert!(msg.contains("companion extension"));
    }
}
