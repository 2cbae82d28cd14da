//! Dependency license scanning
//!
//! Dependencies come from `go mod download -json`. Each module directory in
//! the module cache (or one of its parents, up to the cache root) is searched
//! for license files. Each file is identified by its title (GPL family,
//! MPL, Apache) or by characteristic phrases (permissive licenses).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use gantry_core::ToolchainError;

use crate::console::ProcessRunner;
use crate::go::Toolchain;
use crate::Result;

/// Lower-cased file stems that name a license file
const LICENSE_STEMS: &[&str] = &[
    "copying",
    "licence",
    "license",
    "licence-2.0",
    "license-2.0",
    "licence-apache",
    "license-apache",
    "licence-apache-2.0",
    "license-apache-2.0",
    "licence-mit",
    "license-mit",
    "licenceinfo",
    "licenseinfo",
    "licenceinfo-2.0",
    "licenseinfo-2.0",
    "licenceinfo-apache",
    "licenseinfo-apache",
    "licenceinfo-mit",
    "licenseinfo-mit",
    "mit-licence",
    "mit-license",
    "mit-licenceinfo",
    "mit-licenseinfo",
];

/// Extensions (including the dot) a license file may carry
const LICENSE_EXTENSIONS: &[&str] = &["", ".code", ".docs", ".markdown", ".md", ".mit", ".rst", ".txt"];

/// Markers where the heading of a license text ends and its body begins
const HEADING_END: &[&str] = &["preamble", "terms and conditions", "definitions"];

/// Characters of normalized text searched for a title when no marker is found
const HEADING_LIMIT: usize = 600;

/// How one license is recognized.
///
/// Copyleft texts name each other in their bodies, so those are matched on
/// their title, which must appear in the heading. Permissive licenses have
/// no reliable title and are matched on body phrases alone.
struct Fingerprint {
    id: &'static str,
    title: Option<&'static str>,
    body: &'static [&'static str],
}

impl Fingerprint {
    const fn titled(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title: Some(title),
            body: &[],
        }
    }

    const fn phrases(id: &'static str, body: &'static [&'static str]) -> Self {
        Self {
            id,
            title: None,
            body,
        }
    }

    fn matches(&self, heading: &str, text: &str) -> bool {
        self.title.map_or(true, |title| heading.contains(title))
            && self.body.iter().all(|p| text.contains(p))
    }
}

/// Titled licenses first, most specific title first, then phrase matches
const FINGERPRINTS: &[Fingerprint] = &[
    Fingerprint::titled("AGPL-3.0", "gnu affero general public license version 3"),
    Fingerprint::titled("LGPL-3.0", "gnu lesser general public license version 3"),
    Fingerprint::titled("LGPL-2.1", "gnu lesser general public license version 2.1"),
    Fingerprint::titled("LGPL-2.0", "gnu library general public license version 2"),
    Fingerprint::titled("GPL-3.0", "gnu general public license version 3"),
    Fingerprint::titled("GPL-2.0", "gnu general public license version 2"),
    Fingerprint::titled("MPL-2.0", "mozilla public license version 2.0"),
    Fingerprint::titled("MPL-1.1", "mozilla public license version 1.1"),
    Fingerprint::titled("Apache-2.0", "apache license version 2.0"),
    Fingerprint::phrases(
        "BSD-3-Clause",
        &[
            "redistribution and use in source and binary forms",
            "neither the name",
        ],
    ),
    Fingerprint::phrases(
        "BSD-2-Clause",
        &[
            "redistribution and use in source and binary forms",
            "this list of conditions and the following disclaimer",
        ],
    ),
    Fingerprint::phrases(
        "MIT",
        &[
            "permission is hereby granted, free of charge",
            "the above copyright notice and this permission notice shall be included",
        ],
    ),
    Fingerprint::phrases(
        "ISC",
        &[
            "permission to use, copy, modify, and",
            "distribute this software for any purpose with or without fee is hereby granted",
        ],
    ),
    Fingerprint::phrases(
        "Unlicense",
        &["this is free and unencumbered software released into the public domain"],
    ),
    Fingerprint::phrases(
        "Zlib",
        &[
            "this software is provided 'as-is', without any express or implied",
            "altered source versions must be plainly marked as such",
        ],
    ),
];

/// One module from `go mod download -json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleDependency {
    /// Module path
    pub path: String,
    /// Module version
    #[serde(default)]
    pub version: String,
    /// Extracted module directory in the module cache
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Licenses found for the module
    #[serde(skip)]
    pub licenses: Vec<LicenseInfo>,
}

impl ModuleDependency {
    /// Parse the concatenated JSON objects printed by `go mod download -json`
    pub fn parse_download_output(output: &str) -> Result<Vec<Self>> {
        serde_json::Deserializer::from_str(output)
            .into_iter::<Self>()
            .map(|dep| dep.map_err(|e| ToolchainError::parse("go mod download output", e)))
            .collect()
    }

    /// Names of the identified licenses, comma separated, or `Unknown`
    pub fn license_summary(&self) -> String {
        let names: Vec<&str> = self
            .licenses
            .iter()
            .filter_map(|l| l.name.as_deref())
            .collect();
        if names.is_empty() {
            "Unknown".to_string()
        } else {
            names.join(", ")
        }
    }
}

/// A license file and what it was identified as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseInfo {
    /// File the license was read from
    pub file: PathBuf,
    /// SPDX-like identifier (`Apache-2.0`), unset when not recognized
    pub name: Option<String>,
    /// Family (`Apache`)
    pub kind: Option<String>,
    /// Version (`2.0`)
    pub version: Option<String>,
    /// Modifier (`Clause`, `only`, `or-later`)
    pub modifier: Option<String>,
}

impl LicenseInfo {
    /// Identify the license text read from `file`
    pub fn identify(file: PathBuf, text: &str) -> Self {
        let name = identify_license(text);
        let (kind, version, modifier) = match name {
            Some(id) => split_license_id(id),
            None => (None, None, None),
        };

        Self {
            file,
            name: name.map(str::to_string),
            kind,
            version,
            modifier,
        }
    }
}

/// Match license text against the known fingerprints
pub fn identify_license(text: &str) -> Option<&'static str> {
    let normalized = normalize(text);
    let heading = heading(&normalized);
    FINGERPRINTS
        .iter()
        .find(|fp| fp.matches(heading, &normalized))
        .map(|fp| fp.id)
}

/// Normalized text before the first body marker, capped at `HEADING_LIMIT` chars
fn heading(normalized: &str) -> &str {
    let marker = HEADING_END
        .iter()
        .filter_map(|m| normalized.find(m))
        .min()
        .unwrap_or(normalized.len());
    let end = normalized
        .char_indices()
        .nth(HEADING_LIMIT)
        .map_or(marker, |(idx, _)| idx.min(marker));
    &normalized[..end]
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.trim_start_matches(['#', '*', '>']))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Split `BSD-3-Clause` into (`BSD`, `3`, `Clause`)
pub fn split_license_id(id: &str) -> (Option<String>, Option<String>, Option<String>) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(.+?)(?:-([0-9.]+[a-z]?))?(?:-(only|or-later|Clause))?$")
            .expect("license id pattern is valid")
    });

    match re.captures(id) {
        Some(caps) => {
            let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
            (group(1), group(2), group(3))
        }
        None => (Some(id.to_string()), None, None),
    }
}

fn is_license_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    // stems like `license-2.0` contain a dot of their own
    if LICENSE_STEMS.contains(&lower.as_str()) {
        return true;
    }
    let (stem, ext) = match lower.rfind('.') {
        Some(dot) if dot > 0 => lower.split_at(dot),
        _ => (lower.as_str(), ""),
    };
    LICENSE_STEMS.contains(&stem) && LICENSE_EXTENSIONS.contains(&ext)
}

/// Finds and identifies license files in the module cache
#[derive(Debug, Clone)]
pub struct LicenseScanner {
    mod_cache_root: PathBuf,
}

impl LicenseScanner {
    /// Create a scanner rooted at the module cache
    pub fn new(mod_cache_root: impl Into<PathBuf>) -> Self {
        Self {
            mod_cache_root: mod_cache_root.into(),
        }
    }

    /// Module cache root
    pub fn mod_cache_root(&self) -> &Path {
        &self.mod_cache_root
    }

    /// License files in `dir` (not recursive), sorted
    pub fn find_license_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            if is_license_file(&entry.file_name().to_string_lossy()) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// License files for a module directory, trying parents up to the cache root
    pub fn find_license_files_searching_parents(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut current = Some(dir);
        while let Some(path) = current {
            if !path.starts_with(&self.mod_cache_root) || path == self.mod_cache_root {
                break;
            }
            if path.is_dir() {
                let files = Self::find_license_files(path)?;
                if !files.is_empty() {
                    return Ok(files);
                }
            }
            current = path.parent();
        }
        Ok(Vec::new())
    }

    /// Fill in the licenses of every dependency and sort them by path
    pub fn scan(&self, mut deps: Vec<ModuleDependency>) -> Result<Vec<ModuleDependency>> {
        for dep in &mut deps {
            let Some(dir) = dep.dir.clone() else {
                warn!(module = %dep.path, "module has no directory in the cache");
                continue;
            };

            for file in self.find_license_files_searching_parents(&dir)? {
                let data = fs::read(&file)?;
                let info = LicenseInfo::identify(file, &String::from_utf8_lossy(&data));
                debug!(
                    module = %dep.path,
                    file = %info.file.display(),
                    license = ?info.name,
                    "identified license file"
                );
                dep.licenses.push(info);
            }
        }

        deps.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(deps)
    }

    /// Query the toolchain for the cache root and dependencies, then scan
    pub fn run(runner: &dyn ProcessRunner, toolchain: &Toolchain) -> Result<Vec<ModuleDependency>> {
        let root = runner.capture_output(&toolchain.mod_cache())?;
        let output = runner.capture_output(&toolchain.mod_download())?;
        let deps = ModuleDependency::parse_download_output(&output)?;
        Self::new(root.trim()).scan(deps)
    }
}

/// One `<path> <version> : <licenses>` line per dependency
pub fn report_lines(deps: &[ModuleDependency]) -> Vec<String> {
    deps.iter()
        .map(|dep| format!("{} {} : {}", dep.path, dep.version, dep.license_summary()))
        .collect()
}
