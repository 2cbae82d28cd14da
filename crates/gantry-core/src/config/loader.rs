//! Locating and reading `gantry.toml` / `gantry.yaml`

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::CONFIG_FILE_NAMES;
use super::types::Config;
use super::validation::validate_config;

/// Config file syntax, chosen by extension (`.yaml`/`.yml`, otherwise TOML)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Toml,
        }
    }

    fn parse(self, content: &str) -> std::result::Result<Config, ConfigError> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
        })
    }
}

/// Read, parse and validate one config file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = ConfigFormat::of(path);
    info!(path = %path.display(), ?format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = format.parse(&content)?;

    validate_config(&config)?;
    Ok(config)
}

/// Places a config file may live for one directory, in priority order
fn candidates(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    CONFIG_FILE_NAMES
        .iter()
        .flat_map(move |name| [dir.join(name), dir.join(".github").join(name)])
}

/// Nearest config file in `start_dir` or one of its ancestors.
///
/// Each directory is checked for the file itself and for `.github/<name>`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let found = start_dir
        .ancestors()
        .flat_map(|dir| candidates(dir))
        .find(|path| path.is_file());

    match &found {
        Some(path) => info!(path = %path.display(), "found config file"),
        None => debug!(start_dir = %start_dir.display(), "no config file found"),
    }
    found
}

/// The nearest config, or defaults when there is none.
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    let Some(path) = find_config(dir) else {
        info!(dir = %dir.display(), "no config found, using defaults");
        return Ok((Config::default(), None));
    };
    let config = load_config(&path)?;
    Ok((config, Some(path)))
}
