//! Go toolchain: go.mod parsing, version probing and command construction

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;
use tracing::{debug, info};

use gantry_core::{ExecutableInfo, ToolchainError};

use crate::archs::split_arch;
use crate::console::{CommandSpec, Console, ProcessRunner};
use crate::version::parse_lenient;
use crate::Result;

/// Parsed go.mod file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    /// Module path
    pub module: String,
    /// `go` directive
    pub go_version: Option<String>,
    /// Required module paths
    pub require: Vec<String>,
}

impl GoMod {
    /// Load a go.mod file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ToolchainError::parse(
                "go.mod",
                format!(
                    "{}: {} (run from the project folder)",
                    path.display(),
                    e
                ),
            )
        })?;
        Self::parse(&content)
    }

    /// Parse go.mod content
    pub fn parse(content: &str) -> Result<Self> {
        let mut module = None;
        let mut go_version = None;
        let mut require = Vec::new();
        let mut block: Option<&str> = None;

        for line in content.lines() {
            let line = line.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if let Some(directive) = line.strip_suffix('(') {
                block = Some(directive.trim()).filter(|d| !d.is_empty());
                continue;
            }
            if line == ")" {
                block = None;
                continue;
            }

            match block {
                Some("require") => require.extend(first_field(line)),
                Some(_) => {}
                None => {
                    if let Some(rest) = line.strip_prefix("module ") {
                        module = Some(unquote(rest.trim()).to_string());
                    } else if let Some(rest) = line.strip_prefix("go ") {
                        go_version = Some(rest.trim().to_string());
                    } else if let Some(rest) = line.strip_prefix("require ") {
                        require.extend(first_field(rest));
                    }
                }
            }
        }

        let module = module
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ToolchainError::parse("go.mod", "no module directive"))?;

        Ok(Self {
            module,
            go_version,
            require,
        })
    }

    /// The `go` directive as a version (`1.21` → `1.21.0`)
    pub fn min_go_version(&self) -> Result<Option<Version>> {
        match &self.go_version {
            None => Ok(None),
            Some(raw) => parse_lenient(raw)
                .map(Some)
                .ok_or_else(|| ToolchainError::parse("go directive", raw)),
        }
    }
}

fn first_field(line: &str) -> Option<String> {
    line.split_whitespace().next().map(|s| unquote(s).to_string())
}

fn unquote(s: &str) -> &str {
    s.trim_matches('"')
}

/// Output of `go version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoVersion {
    /// Toolchain version
    pub version: Version,
    /// Host OS
    pub os: String,
    /// Host architecture
    pub arch: String,
}

impl GoVersion {
    /// Parse `go version go1.22.1 linux/amd64`
    pub fn parse_output(output: &str) -> Result<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"(?i)^go version go([0-9.+-]+\S*) (\w+)/(\w+)$")
                .expect("go version pattern is valid")
        });

        let trimmed = output.trim();
        let caps = re
            .captures(trimmed)
            .ok_or_else(|| ToolchainError::parse("go version output", trimmed))?;

        let version = parse_lenient(&caps[1])
            .ok_or_else(|| ToolchainError::parse("go version", &caps[1]))?;

        Ok(Self {
            version,
            os: caps[2].to_string(),
            arch: caps[3].to_string(),
        })
    }
}

/// A located Go toolchain
#[derive(Debug, Clone)]
pub struct Toolchain {
    go: PathBuf,
    version: GoVersion,
}

impl Toolchain {
    /// Create from an already known executable and version
    pub fn new(go: impl Into<PathBuf>, version: GoVersion) -> Self {
        Self {
            go: go.into(),
            version,
        }
    }

    /// Locate `go` in PATH and probe its version
    pub fn detect(console: &Console) -> Result<Self> {
        let go = console.find_executable("go")?;
        Self::probe(console, go)
    }

    /// Probe the version of a known executable
    pub fn probe(runner: &dyn ProcessRunner, go: PathBuf) -> Result<Self> {
        let output = runner.capture_output(&CommandSpec::new(&go).arg("version"))?;
        let version = GoVersion::parse_output(&output)?;
        info!(version = %version.version, host = %format!("{}/{}", version.os, version.arch), "detected go toolchain");
        Ok(Self { go, version })
    }

    /// Path to the `go` executable
    pub fn go(&self) -> &Path {
        &self.go
    }

    /// Probed version
    pub fn version(&self) -> &GoVersion {
        &self.version
    }

    /// Fail when the toolchain is older than `required`
    pub fn check_min_version(&self, required: Option<&Version>) -> Result<()> {
        match required {
            Some(required) if self.version.version < *required => {
                Err(ToolchainError::UnsupportedVersion {
                    found: self.version.version.to_string(),
                    required: required.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// `go generate ./...`
    pub fn generate(&self) -> CommandSpec {
        CommandSpec::new(&self.go).args(["generate", "./..."])
    }

    /// `go test ./...`
    pub fn test(&self) -> CommandSpec {
        CommandSpec::new(&self.go).args(["test", "./..."])
    }

    /// `go env GOMODCACHE`
    pub fn mod_cache(&self) -> CommandSpec {
        CommandSpec::new(&self.go).args(["env", "GOMODCACHE"])
    }

    /// `go mod download -json`
    pub fn mod_download(&self) -> CommandSpec {
        CommandSpec::new(&self.go).args(["mod", "download", "-json"])
    }

    /// Cross-compile one executable for one architecture
    pub fn build(&self, request: &BuildRequest<'_>) -> CommandSpec {
        request.to_command(&self.go)
    }
}

/// One `go build` invocation
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    /// Executable being built
    pub executable: &'a ExecutableInfo,
    /// Target `os/arch`
    pub arch: &'a str,
    /// Output binary
    pub output: &'a Path,
}

impl BuildRequest<'_> {
    /// Linker flags: plain flags, then `-X "k=v"` per variable in key order
    pub fn ldflags(&self) -> Option<String> {
        let exec = self.executable;
        if exec.ldflags.is_empty() && exec.ldflags_vars.is_empty() {
            return None;
        }

        let mut flags = exec.ldflags.clone();
        for (key, value) in &exec.ldflags_vars {
            flags.push("-X".to_string());
            flags.push(format!("\"{}={}\"", key, value));
        }
        Some(flags.join(" "))
    }

    fn to_command(&self, go: &Path) -> CommandSpec {
        let (os, arch) = split_arch(self.arch);
        let exec = self.executable;

        let mut spec = CommandSpec::new(go).env("GOOS", os).env("GOARCH", arch);
        if !exec.cgo {
            spec = spec.env("CGO_ENABLED", "0");
        }

        spec = spec.arg("build").args(exec.build_args.iter().cloned());
        if let Some(ldflags) = self.ldflags() {
            spec = spec.arg("-ldflags").arg(ldflags);
        }

        let spec = spec
            .arg("-o")
            .arg(self.output.display().to_string())
            .arg(exec.path.display().to_string());
        debug!(command = %spec.display(), "prepared build");
        spec
    }
}
