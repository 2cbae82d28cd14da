//! Gantry Toolchain - External collaborators of the target engine
//!
//! Process execution, Go toolchain probing, architecture resolution,
//! artifact naming, git metadata, executable discovery, zip packaging and
//! dependency license scanning. Target actions wrap these calls.

pub mod archs;
pub mod artifacts;
pub mod console;
pub mod discovery;
pub mod git;
pub mod go;
pub mod license;
pub mod package;
pub mod version;

pub use archs::{split_arch, ArchCatalog};
pub use artifacts::{sanitize_file_name, ArtifactNamer};
pub use console::{CommandSpec, Console, ProcessRunner};
pub use discovery::{discover_mains, DiscoveredMain};
pub use git::probe_git;
pub use go::{BuildRequest, GoMod, GoVersion, Toolchain};
pub use license::{report_lines, LicenseInfo, LicenseScanner, ModuleDependency};
pub use package::{clean_archives, zip_executable};

/// Result type for toolchain operations
pub type Result<T> = std::result::Result<T, gantry_core::ToolchainError>;
