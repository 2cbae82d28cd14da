//! Executable discovery

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::Result;

/// Directory names whose executables are built but never published
const UNPUBLISHED_DIRS: &[&str] = &["examples", "_examples", "internal"];

/// A directory holding a main file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredMain {
    /// Executable name
    pub name: String,
    /// Absolute directory
    pub path: PathBuf,
    /// Directory relative to the project root, `/`-separated (`.` for the root)
    pub relative: String,
    /// Import path of the package
    pub package: String,
    /// Whether archives should be produced
    pub publish: bool,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Find every directory under `base_dir` containing one of `main_file_names`.
///
/// Dot-directories are skipped. Results are sorted by relative path.
pub fn discover_mains(
    base_dir: &Path,
    module: &str,
    main_file_names: &[String],
) -> Result<Vec<DiscoveredMain>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(base_dir)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if !main_file_names.iter().any(|m| m.as_str() == file_name) {
            continue;
        }

        let Some(dir) = entry.path().parent() else {
            continue;
        };
        if found.iter().any(|d: &DiscoveredMain| d.path == dir) {
            continue;
        }

        let relative = relative_slash_path(base_dir, dir);
        found.push(describe(dir, relative, module));
    }

    found.sort_by(|a, b| a.relative.cmp(&b.relative));
    debug!(count = found.len(), "discovered executables");
    Ok(found)
}

fn relative_slash_path(base_dir: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(base_dir).unwrap_or(dir);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn describe(dir: &Path, relative: String, module: &str) -> DiscoveredMain {
    let (name, package) = if relative == "." {
        let base = module.rsplit('/').next().unwrap_or(module);
        (base.to_string(), module.to_string())
    } else {
        let base = relative.rsplit('/').next().unwrap_or(&relative);
        (base.to_string(), format!("{}/{}", module, relative))
    };

    let publish = !relative
        .split('/')
        .any(|segment| UNPUBLISHED_DIRS.contains(&segment));

    DiscoveredMain {
        name,
        path: dir.to_path_buf(),
        relative,
        package,
        publish,
    }
}
