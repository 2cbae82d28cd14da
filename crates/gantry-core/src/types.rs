//! Project metadata types

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use semver::Version;
use serde::Serialize;

use crate::error::{Result, ToolchainError};

/// Version-control metadata. Every field is optional: a missing git binary
/// or a repository without tags simply leaves it unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitInfo {
    /// Version parsed from the nearest tag (`git describe --tags --dirty`)
    pub tag: Option<Version>,
    /// Full hash of the HEAD commit
    pub commit: Option<String>,
    /// Author date of the HEAD commit
    pub commit_date: Option<DateTime<FixedOffset>>,
}

/// Source-level project metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeInfo {
    /// Project root
    pub base_dir: PathBuf,
    /// Module path from go.mod
    pub module: String,
    /// Version stamped into binaries and archive names
    pub version: Version,
    /// Build date stamped into binaries
    pub build_date: DateTime<FixedOffset>,
    /// Minimum toolchain version from the go.mod `go` directive
    pub min_go_version: Option<Version>,
}

impl CodeInfo {
    /// Derive code info from module metadata and git state.
    ///
    /// The version is the git tag when there is one, otherwise
    /// `0.0.0-devel+<short commit>.<timestamp>`. The build date is the commit
    /// date when known, otherwise `now`.
    pub fn derive(
        base_dir: PathBuf,
        module: String,
        min_go_version: Option<Version>,
        git: &GitInfo,
        now: DateTime<FixedOffset>,
    ) -> Result<Self> {
        let build_date = git.commit_date.unwrap_or(now);

        let version = match &git.tag {
            Some(tag) => tag.clone(),
            None => devel_version(git.commit.as_deref(), &build_date)?,
        };

        Ok(Self {
            base_dir,
            module,
            version,
            build_date,
            min_go_version,
        })
    }

    /// Last path segment of the module (used to name a root executable)
    pub fn module_base_name(&self) -> &str {
        self.module
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(self.module.as_str())
    }
}

fn devel_version(commit: Option<&str>, date: &DateTime<FixedOffset>) -> Result<Version> {
    let mut raw = String::from("0.0.0-devel+");
    if let Some(commit) = commit.filter(|c| !c.is_empty()) {
        let short: String = commit.chars().take(7).collect();
        raw.push_str(&short);
        raw.push('.');
    }
    raw.push_str(&date.format("%Y%m%d%H%M%S").to_string());

    Version::parse(&raw).map_err(|e| ToolchainError::from(e).into())
}

/// An executable found in the project, with everything needed to build it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutableInfo {
    /// Executable name
    pub name: String,
    /// Absolute source directory
    pub path: PathBuf,
    /// Import path of the main package
    pub package: String,
    /// Architectures to build for
    pub archs: Vec<String>,
    /// Whether cgo is enabled
    pub cgo: bool,
    /// Extra `go build` arguments
    pub build_args: Vec<String>,
    /// Plain linker flags
    pub ldflags: Vec<String>,
    /// `-X` variables for the linker
    pub ldflags_vars: BTreeMap<String, String>,
    /// Whether archives are produced for this executable
    pub publish: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_version_from_tag() {
        let git = GitInfo {
            tag: Some(Version::parse("1.4.0").unwrap()),
            commit: Some("0123456789abcdef".to_string()),
            commit_date: Some(date("2024-03-01T10:20:30+01:00")),
        };
        let code = CodeInfo::derive(
            PathBuf::from("/src"),
            "example.com/tools/app".to_string(),
            None,
            &git,
            date("2025-01-01T00:00:00Z"),
        )
        .unwrap();

        assert_eq!(code.version.to_string(), "1.4.0");
        assert_eq!(code.build_date, date("2024-03-01T10:20:30+01:00"));
    }

    #[test]
    fn test_devel_version_with_commit() {
        let git = GitInfo {
            tag: None,
            commit: Some("abcdef0123456789".to_string()),
            commit_date: Some(date("2024-03-01T10:20:30Z")),
        };
        let code = CodeInfo::derive(
            PathBuf::from("/src"),
            "app".to_string(),
            None,
            &git,
            date("2025-01-01T00:00:00Z"),
        )
        .unwrap();

        assert_eq!(
            code.version.to_string(),
            "0.0.0-devel+abcdef0.20240301102030"
        );
    }

    #[test]
    fn test_devel_version_without_git() {
        let code = CodeInfo::derive(
            PathBuf::from("/src"),
            "app".to_string(),
            None,
            &GitInfo::default(),
            date("2025-06-07T08:09:10Z"),
        )
        .unwrap();

        assert_eq!(code.version.to_string(), "0.0.0-devel+20250607080910");
        assert_eq!(code.build_date, date("2025-06-07T08:09:10Z"));
    }

    #[test]
    fn test_module_base_name() {
        let code = CodeInfo::derive(
            PathBuf::from("/src"),
            "github.com/acme/widget".to_string(),
            None,
            &GitInfo::default(),
            date("2025-06-07T08:09:10Z"),
        )
        .unwrap();
        assert_eq!(code.module_base_name(), "widget");
    }
}
