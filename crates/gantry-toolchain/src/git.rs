//! Git metadata probing
//!
//! Every probe is optional: a repository without tags, a shallow clone or a
//! missing git binary leaves the corresponding field unset.

use std::path::Path;

use chrono::DateTime;
use tracing::debug;

use gantry_core::GitInfo;

use crate::console::{CommandSpec, ProcessRunner};
use crate::version::parse_lenient;

/// Collect tag, commit and commit date from `git`
pub fn probe_git(runner: &dyn ProcessRunner, git: &Path) -> GitInfo {
    let capture = |args: &[&str]| -> Option<String> {
        runner
            .capture_output(&CommandSpec::new(git).args(args.iter().copied()))
            .map_err(|e| debug!(error = %e, "git probe failed"))
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|out| !out.is_empty())
    };

    let tag = capture(&["describe", "--tags", "--dirty"]).and_then(|raw| parse_lenient(&raw));
    let commit = capture(&["log", "-1", "--format=%H"]);
    let commit_date = capture(&["log", "-1", "--format=%aI"])
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok());

    debug!(
        tag = ?tag.as_ref().map(ToString::to_string),
        commit = ?commit,
        "probed git metadata"
    );

    GitInfo {
        tag,
        commit,
        commit_date,
    }
}

#[cfg(test)]
mod tests {
    use semver::Version;

    use super::*;
    use crate::console::testing::ScriptedRunner;

    #[test]
    fn test_tagged_repository() {
        let runner = ScriptedRunner::default()
            .with("git describe --tags --dirty", "v2.3.4")
            .with("git log -1 --format=%H", "0123456789abcdef0123456789abcdef01234567")
            .with("git log -1 --format=%aI", "2024-05-06T07:08:09+02:00");

        let info = probe_git(&runner, Path::new("git"));
        assert_eq!(info.tag, Some(Version::new(2, 3, 4)));
        assert_eq!(
            info.commit.as_deref(),
            Some("0123456789abcdef0123456789abcdef01234567")
        );
        assert_eq!(
            info.commit_date.unwrap().to_rfc3339(),
            "2024-05-06T07:08:09+02:00"
        );
    }

    #[test]
    fn test_dirty_tag_is_prerelease() {
        let runner = ScriptedRunner::default()
            .with("git describe --tags --dirty", "v1.0.0-3-g1a2b3c4-dirty");
        let info = probe_git(&runner, Path::new("git"));
        let tag = info.tag.unwrap();
        assert_eq!((tag.major, tag.minor, tag.patch), (1, 0, 0));
        assert!(!tag.pre.is_empty());
    }

    #[test]
    fn test_untagged_repository() {
        let runner = ScriptedRunner::default()
            .with("git log -1 --format=%H", "abcdef0")
            .with("git log -1 --format=%aI", "not a date");

        let info = probe_git(&runner, Path::new("git"));
        assert_eq!(info.tag, None);
        assert_eq!(info.commit.as_deref(), Some("abcdef0"));
        assert_eq!(info.commit_date, None);
    }

    #[test]
    fn test_non_semver_tag_is_ignored() {
        let runner =
            ScriptedRunner::default().with("git describe --tags --dirty", "release-candidate");
        assert_eq!(probe_git(&runner, Path::new("git")).tag, None);
    }

    #[test]
    fn test_no_git_metadata() {
        let info = probe_git(&ScriptedRunner::default(), Path::new("git"));
        assert_eq!(info, GitInfo::default());
    }
}
