//! Architecture resolution
//!
//! The toolchain reports every `os/arch` pair it can target. Both the OS
//! family (`linux`) and the exact pair (`linux/amd64`) act as selectors.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use gantry_core::ToolchainError;

use crate::console::{CommandSpec, ProcessRunner};
use crate::Result;

/// Selector → concrete `os/arch` pairs offered by the toolchain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchCatalog {
    selectors: BTreeMap<String, Vec<String>>,
}

impl ArchCatalog {
    /// Build a catalog from `go tool dist list` output
    pub fn parse(dist_list: &str) -> Self {
        let mut selectors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for line in dist_list.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (os, _) = split_arch(line);
            selectors
                .entry(os.to_string())
                .or_default()
                .push(line.to_string());
            selectors
                .entry(line.to_string())
                .or_default()
                .push(line.to_string());
        }

        Self { selectors }
    }

    /// Ask the toolchain for its target list
    pub fn probe(runner: &dyn ProcessRunner, go: &std::path::Path) -> Result<Self> {
        let output = runner.capture_output(&CommandSpec::new(go).args(["tool", "dist", "list"]))?;
        let catalog = Self::parse(&output);
        debug!(pairs = catalog.all().len(), "loaded architecture catalog");
        Ok(catalog)
    }

    /// Expand selectors into concrete pairs.
    ///
    /// An empty `desired` list selects every pair. The result is sorted and
    /// free of duplicates.
    pub fn resolve(&self, desired: &[String]) -> Result<Vec<String>> {
        if desired.is_empty() {
            return Ok(self.all());
        }

        let mut result = BTreeSet::new();
        for selector in desired {
            let pairs = self
                .selectors
                .get(selector.as_str())
                .ok_or_else(|| ToolchainError::UnknownArch(selector.clone()))?;
            result.extend(pairs.iter().cloned());
        }

        Ok(result.into_iter().collect())
    }

    /// Every concrete `os/arch` pair, sorted
    pub fn all(&self) -> Vec<String> {
        self.selectors
            .keys()
            .filter(|k| k.contains('/'))
            .cloned()
            .collect()
    }

    /// Whether the catalog knows this selector
    pub fn contains(&self, selector: &str) -> bool {
        self.selectors.contains_key(selector)
    }
}

/// Split `os/arch` into its parts. A value without `/` is all OS.
pub fn split_arch(arch: &str) -> (&str, &str) {
    arch.split_once('/').unwrap_or((arch, ""))
}
