//! Error types for Gantry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for Gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Toolchain and external process errors
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the toolchain, git and other external collaborators
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// Executable not found in PATH
    #[error("{tool} executable not found in PATH: {reason}")]
    ToolNotFound { tool: String, reason: String },

    /// Command could not be started or exited unsuccessfully
    #[error("Command failed: {command} - {reason}")]
    CommandFailed { command: String, reason: String },

    /// OS/ARCH selector not offered by the toolchain
    #[error("OS/ARCH not available: '{0}'")]
    UnknownArch(String),

    /// Toolchain older than the project requires
    #[error("unsupported go version {found} - should be at least {required}")]
    UnsupportedVersion { found: String, required: String },

    /// Unexpected tool output or manifest content
    #[error("Failed to parse {what}: {reason}")]
    ParseFailed { what: String, reason: String },

    /// Compiled executable missing when packaging
    #[error("error accessing compiled executable {0}")]
    MissingArtifact(PathBuf),

    /// Archive could not be written
    #[error("Failed to write archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    /// Semver error
    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolchainError {
    /// Create a parse failure
    pub fn parse(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::ParseFailed {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

impl GantryError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
