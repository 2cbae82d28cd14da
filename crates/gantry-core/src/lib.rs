//! Gantry Core - Core library for the Gantry build orchestrator
//!
//! This crate provides the error types, configuration loading and the
//! project metadata (code, git and executable information) shared by the
//! toolchain collaborators and the CLI.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, GantryError, Result, ToolchainError};
pub use types::{CodeInfo, ExecutableInfo, GitInfo};
