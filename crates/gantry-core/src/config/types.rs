//! Configuration types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_OS_FAMILIES, DEFAULT_OUTPUT_DIR, DEFAULT_TARGET};

/// Main configuration for Gantry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Build configuration
    pub build: BuildConfig,

    /// Run configuration
    pub run: RunConfig,
}

/// Project layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name (defaults to the last segment of the module path)
    pub name: Option<String>,

    /// File names that mark a directory as an executable
    pub main_file_names: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            main_file_names: vec!["main.go".to_string()],
        }
    }
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// OS/ARCH selectors (`linux`, `linux/amd64`, ...).
    ///
    /// Unset means the default OS families; an explicit empty list means
    /// every architecture the toolchain supports.
    pub archs: Option<Vec<String>>,

    /// Whether to build with cgo enabled
    pub cgo: bool,

    /// Keep symbol tables and DWARF (otherwise `-s -w` is passed to the linker)
    pub preserve_symbols: bool,

    /// Extra arguments passed to `go build`
    pub build_args: Vec<String>,

    /// Variables injected with `-ldflags -X`
    pub ldflags_vars: BTreeMap<String, String>,

    /// Output directory, relative to the project root
    pub output_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            archs: None,
            cgo: false,
            preserve_symbols: true,
            build_args: vec!["-trimpath".to_string()],
            ldflags_vars: BTreeMap::new(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

impl BuildConfig {
    /// Selectors to hand to the architecture resolver
    pub fn arch_selectors(&self) -> Vec<String> {
        match &self.archs {
            Some(archs) => archs.clone(),
            None => DEFAULT_OS_FAMILIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Linker flags implied by the configuration
    pub fn ldflags(&self) -> Vec<String> {
        if self.preserve_symbols {
            Vec::new()
        } else {
            vec!["-s".to_string(), "-w".to_string()]
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Target run when none is named on the command line
    pub default_target: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            default_target: DEFAULT_TARGET.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.project.main_file_names, vec!["main.go"]);
        assert!(config.build.archs.is_none());
        assert!(config.build.preserve_symbols);
        assert_eq!(config.build.build_args, vec!["-trimpath"]);
        assert_eq!(config.build.output_dir, "build");
        assert_eq!(config.run.default_target, "all");
    }

    #[test]
    fn test_unset_archs_use_default_families() {
        let build = BuildConfig::default();
        assert_eq!(
            build.arch_selectors(),
            vec!["darwin", "freebsd", "linux", "netbsd", "openbsd", "windows"]
        );
    }

    #[test]
    fn test_explicit_empty_archs_preserved() {
        let config: Config = toml::from_str("[build]\narchs = []\n").unwrap();
        assert_eq!(config.build.archs, Some(Vec::new()));
        assert!(config.build.arch_selectors().is_empty());
    }

    #[test]
    fn test_ldflags_strip_symbols() {
        let build = BuildConfig {
            preserve_symbols: false,
            ..Default::default()
        };
        assert_eq!(build.ldflags(), vec!["-s", "-w"]);
        assert!(BuildConfig::default().ldflags().is_empty());
    }

    #[test]
    fn test_partial_yaml() {
        let config: Config =
            serde_yaml::from_str("build:\n  cgo: true\n  ldflags_vars:\n    main.flavor: pro\n")
                .unwrap();
        assert!(config.build.cgo);
        assert_eq!(
            config.build.ldflags_vars.get("main.flavor").map(String::as_str),
            Some("pro")
        );
        assert_eq!(config.build.build_args, vec!["-trimpath"]);
    }
}
