//! Default configuration values

/// Config file names checked in each directory, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &["gantry.toml", "gantry.yaml", ".gantry.toml", ".gantry.yaml"];

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Default target to run
pub const DEFAULT_TARGET: &str = "all";

/// OS families built when no architectures are configured
pub const DEFAULT_OS_FAMILIES: &[&str] = &["darwin", "freebsd", "linux", "netbsd", "openbsd", "windows"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_os_families_sorted() {
        let mut sorted = DEFAULT_OS_FAMILIES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, DEFAULT_OS_FAMILIES);
    }

    #[test]
    fn test_toml_names_come_first() {
        assert_eq!(CONFIG_FILE_NAMES[0], "gantry.toml");
        assert!(CONFIG_FILE_NAMES.iter().all(|n| n.contains("gantry")));
    }
}
