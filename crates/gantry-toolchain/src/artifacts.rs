//! Output artifact naming

use std::path::{Path, PathBuf};

use semver::Version;

use crate::archs::split_arch;

const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', ' ', '/', '\\', '|', '?', '*'];

/// Computes where binaries and archives are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNamer {
    base_dir: PathBuf,
    output_dir: PathBuf,
}

impl ArtifactNamer {
    /// Create a namer for a project root and a relative output directory
    pub fn new(base_dir: impl Into<PathBuf>, output_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.into();
        let output_dir = base_dir.join(output_dir);
        Self {
            base_dir,
            output_dir,
        }
    }

    /// Project root
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<out>/<os>/<arch>/<name>`, with `.exe` for Windows targets
    pub fn binary_path(&self, executable: &str, arch: &str) -> PathBuf {
        let (os, cpu) = split_arch(arch);
        let mut file_name = executable.to_string();
        if os == "windows" {
            file_name.push_str(".exe");
        }

        let mut path = self.output_dir.join(os);
        if !cpu.is_empty() {
            path.push(cpu);
        }
        path.join(file_name)
    }

    /// `<out>/<name>-<version>-<os>_<arch>.zip`, sanitized
    pub fn archive_path(&self, executable: &str, version: &Version, arch: &str) -> PathBuf {
        let name = format!("{}-{}-{}.zip", executable, version, arch.replace('/', "_"));
        self.output_dir.join(sanitize_file_name(&name))
    }
}

/// Replace characters that are unsafe in file names with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if INVALID_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namer() -> ArtifactNamer {
        ArtifactNamer::new("/work/app", "build")
    }

    #[test]
    fn test_binary_path() {
        assert_eq!(
            namer().binary_path("tool", "linux/arm64"),
            PathBuf::from("/work/app/build/linux/arm64/tool")
        );
    }

    #[test]
    fn test_windows_binary_gets_exe() {
        assert_eq!(
            namer().binary_path("tool", "windows/amd64"),
            PathBuf::from("/work/app/build/windows/amd64/tool.exe")
        );
    }

    #[test]
    fn test_archive_path() {
        let version = Version::parse("1.2.3").unwrap();
        assert_eq!(
            namer().archive_path("tool", &version, "darwin/arm64"),
            PathBuf::from("/work/app/build/tool-1.2.3-darwin_arm64.zip")
        );
    }

    #[test]
    fn test_archive_path_keeps_build_metadata() {
        let version = Version::parse("0.0.0-devel+abcdef0.20240301102030").unwrap();
        let path = namer().archive_path("tool", &version, "linux/amd64");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "tool-0.0.0-devel+abcdef0.20240301102030-linux_amd64.zip"
        );
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a<b>c:d e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_file_name("plain-name.zip"), "plain-name.zip");
    }

    #[test]
    fn test_custom_output_dir() {
        let namer = ArtifactNamer::new("/work/app", "dist/bin");
        assert_eq!(namer.output_dir(), Path::new("/work/app/dist/bin"));
        assert_eq!(namer.base_dir(), Path::new("/work/app"));
    }
}
