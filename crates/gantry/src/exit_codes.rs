//! Exit codes for the CLI

use gantry_core::{ConfigError, GantryError, ToolchainError};
use gantry_targets::{RegistryError, ResolveError, RunError};

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Target resolution or execution error
pub const TARGET_ERROR: i32 = 3;

/// Toolchain or external command error
pub const TOOLCHAIN_ERROR: i32 = 4;

/// Pick the exit code for a top-level error
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return CONFIG_ERROR;
        }
        if cause.is::<RunError>() || cause.is::<ResolveError>() || cause.is::<RegistryError>() {
            return TARGET_ERROR;
        }
        if cause.is::<ToolchainError>() {
            return TOOLCHAIN_ERROR;
        }
        if let Some(gantry) = cause.downcast_ref::<GantryError>() {
            return match gantry {
                GantryError::Config(_) => CONFIG_ERROR,
                GantryError::Toolchain(_) => TOOLCHAIN_ERROR,
                GantryError::Io(_) | GantryError::Other(_) => ERROR,
            };
        }
    }
    ERROR
}
