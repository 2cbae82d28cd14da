//! Styled terminal output shared by the gantry commands

use std::fmt::Display;
use std::path::Path;

use console::style;

/// `✓ message` on stdout
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// `✗ message` on stderr
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Section title with an optional item count, e.g. `Targets (12)`
pub fn section(title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => style(format!("{} ({})", title, n)).bold().to_string(),
        None => style(title).bold().to_string(),
    }
}

/// Indented `key: value` line with keys padded to a common width
pub fn field(key: &str, value: impl Display) -> String {
    format!("  {:<12} {}", style(format!("{}:", key)).dim(), value)
}

/// A target name as shown in listings
pub fn target(name: impl Display) -> String {
    style(name).cyan().to_string()
}

pub fn version(version: impl Display) -> String {
    style(version).green().bold().to_string()
}

pub fn path(path: &Path) -> String {
    style(path.display()).dim().to_string()
}

/// `1 target`, `3 targets`
pub fn count(n: usize, noun: &str) -> String {
    format!("{} {}{}", n, noun, if n == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_pads_keys() {
        console::set_colors_enabled(false);
        assert_eq!(field("Go", "1.22.0"), "  Go:          1.22.0");
        assert_eq!(field("Build date", 3), "  Build date:  3");
    }

    #[test]
    fn test_section_and_count() {
        console::set_colors_enabled(false);
        assert_eq!(section("Targets", Some(12)), "Targets (12)");
        assert_eq!(section("Project", None), "Project");
        assert_eq!(count(1, "architecture"), "1 architecture");
        assert_eq!(count(0, "target"), "0 targets");
    }
}
