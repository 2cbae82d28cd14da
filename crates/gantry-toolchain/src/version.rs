//! Lenient version parsing for tool output and tags

use semver::Version;

/// Parse a version the way tags and toolchains write them.
///
/// Accepts a leading `v`, and pads missing minor/patch components
/// (`1.22` → `1.22.0`). Anything after the numeric core is kept as
/// pre-release/build metadata when it is valid semver.
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);

    if let Ok(version) = Version::parse(raw) {
        return Some(version);
    }

    let core_len = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (core, rest) = raw.split_at(core_len);

    let mut parts: Vec<&str> = core.split('.').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }

    let padded = format!("{}{}", parts.join("."), rest);
    Version::parse(&padded)
        .ok()
        .or_else(|| Version::parse(&parts.join(".")).ok())
}
