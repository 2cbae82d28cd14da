//! Configuration validation

use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_project(config)?;
    validate_build(config)?;
    validate_run(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> crate::error::GantryError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
    .into()
}

fn validate_project(config: &Config) -> Result<()> {
    if config.project.main_file_names.is_empty() {
        return Err(invalid(
            "project.main_file_names",
            "at least one main file name is required",
        ));
    }

    if config
        .project
        .main_file_names
        .iter()
        .any(|n| n.trim().is_empty() || n.contains('/') || n.contains('\\'))
    {
        return Err(invalid(
            "project.main_file_names",
            "entries must be plain file names",
        ));
    }

    if let Some(name) = &config.project.name {
        if name.trim().is_empty() {
            return Err(invalid("project.name", "name cannot be empty"));
        }
    }

    Ok(())
}

fn validate_build(config: &Config) -> Result<()> {
    if let Some(archs) = &config.build.archs {
        if archs.iter().any(|a| a.trim().is_empty()) {
            return Err(invalid("build.archs", "selectors cannot be empty"));
        }
    }

    if config.build.output_dir.trim().is_empty() {
        return Err(invalid("build.output_dir", "output directory cannot be empty"));
    }

    if Path::new(&config.build.output_dir).is_absolute() {
        return Err(invalid(
            "build.output_dir",
            "must be relative to the project root",
        ));
    }

    if config.build.ldflags_vars.keys().any(|k| k.trim().is_empty()) {
        return Err(invalid("build.ldflags_vars", "variable names cannot be empty"));
    }

    Ok(())
}

fn validate_run(config: &Config) -> Result<()> {
    if config.run.default_target.trim().is_empty() {
        return Err(invalid("run.default_target", "default target cannot be empty"));
    }
    Ok(())
}
