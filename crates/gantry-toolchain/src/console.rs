//! External process execution

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use gantry_core::ToolchainError;

use crate::Result;

/// A command line to run: program, arguments, extra environment and
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run
    pub program: PathBuf,
    /// Arguments
    pub args: Vec<String>,
    /// Variables added on top of the inherited environment
    pub env: Vec<(String, String)>,
    /// Working directory (the runner's directory when unset)
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Create a new command
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            working_dir: None,
        }
    }

    /// Add an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Quoted command line for logs and error messages
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        parts.push(self.program.display().to_string());
        parts.extend(self.args.iter().cloned());
        format!("'{}'", parts.join("' '"))
    }
}

/// Runs external processes on behalf of target actions
pub trait ProcessRunner {
    /// Run with inherited stdio and wait for completion
    fn run_inline(&self, spec: &CommandSpec) -> Result<()>;

    /// Run and return stdout with trailing newlines trimmed
    fn capture_output(&self, spec: &CommandSpec) -> Result<String>;
}

/// Process runner rooted at the project directory
#[derive(Debug, Clone)]
pub struct Console {
    dir: PathBuf,
}

impl Console {
    /// Create a console whose commands run in `dir` by default
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default working directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locate an executable in PATH and return its absolute path
    pub fn find_executable(&self, name: &str) -> Result<PathBuf> {
        let found = which::which(name).map_err(|e| ToolchainError::ToolNotFound {
            tool: name.to_string(),
            reason: e.to_string(),
        })?;

        let absolute = if found.is_absolute() {
            found
        } else {
            std::env::current_dir()?.join(found)
        };
        debug!(tool = name, path = %absolute.display(), "found executable");
        Ok(absolute)
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(spec.working_dir.as_deref().unwrap_or(self.dir.as_path()));
        cmd
    }
}

impl ProcessRunner for Console {
    fn run_inline(&self, spec: &CommandSpec) -> Result<()> {
        info!("Executing {}", spec.display());

        let status = self
            .command(spec)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| ToolchainError::CommandFailed {
                command: spec.display(),
                reason: format!("failed to spawn: {}", e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolchainError::CommandFailed {
                command: spec.display(),
                reason: exit_reason(status.code()),
            })
        }
    }

    fn capture_output(&self, spec: &CommandSpec) -> Result<String> {
        debug!(command = %spec.display(), "capturing output");

        let output = self
            .command(spec)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ToolchainError::CommandFailed {
                command: spec.display(),
                reason: format!("failed to spawn: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolchainError::CommandFailed {
                command: spec.display(),
                reason: format!("{}: {}", exit_reason(output.status.code()), stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn exit_reason(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Runner that answers from a table keyed by `program arg arg...`
    #[derive(Default)]
    pub struct ScriptedRunner {
        outputs: HashMap<String, String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn with(mut self, command: &str, output: &str) -> Self {
            self.outputs.insert(command.to_string(), output.to_string());
            self
        }

        fn key(spec: &CommandSpec) -> String {
            let mut parts = vec![spec.program.display().to_string()];
            parts.extend(spec.args.iter().cloned());
            parts.join(" ")
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run_inline(&self, spec: &CommandSpec) -> Result<()> {
            self.calls.lock().unwrap().push(Self::key(spec));
            Ok(())
        }

        fn capture_output(&self, spec: &CommandSpec) -> Result<String> {
            let key = Self::key(spec);
            self.calls.lock().unwrap().push(key.clone());
            self.outputs
                .get(&key)
                .cloned()
                .ok_or_else(|| ToolchainError::CommandFailed {
                    command: key,
                    reason: "exited with code 1".to_string(),
                })
        }
    }
}
