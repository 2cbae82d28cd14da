//! Project setup: probes the environment and registers the base targets

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use tracing::{debug, info, instrument};

use gantry_core::config::load_config_or_default;
use gantry_core::{CodeInfo, Config, ExecutableInfo, GitInfo};
use gantry_targets::{
    action, synthesize_build_and_package, Action, GridExecutable, TargetGraph, TargetRegistry,
};
use gantry_toolchain::{
    clean_archives, discover_mains, probe_git, report_lines, zip_executable, ArchCatalog,
    ArtifactNamer, BuildRequest, Console, GoMod, LicenseScanner, ProcessRunner, Toolchain,
};

/// Target names registered by every project
pub mod names {
    pub const GENERATE: &str = "generate";
    pub const TEST: &str = "test";
    pub const CLEAN_ZIP: &str = "clean-zip";
    pub const LICENSES: &str = "licenses";
    pub const ALL: &str = "all";
}

/// Everything known about the project before targets are registered
pub struct Project {
    /// Loaded configuration
    pub config: Config,
    /// Configuration file, when one was found
    pub config_path: Option<PathBuf>,
    /// Go toolchain
    pub toolchain: Toolchain,
    /// Git metadata
    pub git: GitInfo,
    /// Module, version and build date
    pub code: CodeInfo,
    /// Resolved `os/arch` pairs
    pub archs: Vec<String>,
    /// Discovered executables
    pub executables: Vec<ExecutableInfo>,
    /// Output locations
    pub namer: ArtifactNamer,
    runner: Arc<dyn ProcessRunner>,
}

impl Project {
    /// Probe the project rooted at `dir`.
    ///
    /// `arch_override` replaces the configured selectors when non-empty.
    #[instrument(skip(arch_override))]
    pub fn load(dir: &Path, arch_override: &[String]) -> anyhow::Result<Self> {
        let (config, config_path) = load_config_or_default(dir)?;

        let console = Console::new(dir);
        let toolchain = Toolchain::detect(&console)?;

        let git = match console.find_executable("git") {
            Ok(git) => probe_git(&console, &git),
            Err(e) => {
                debug!(error = %e, "git not available, skipping version metadata");
                GitInfo::default()
            }
        };

        let gomod = GoMod::load(&dir.join("go.mod"))?;
        let code = CodeInfo::derive(
            dir.to_path_buf(),
            gomod.module.clone(),
            gomod.min_go_version()?,
            &git,
            Local::now().fixed_offset(),
        )?;

        let catalog = ArchCatalog::probe(&console, toolchain.go())?;

        Self::assemble(
            config,
            config_path,
            toolchain,
            git,
            code,
            &catalog,
            arch_override,
            Arc::new(console),
        )
    }

    /// Build the project from already probed parts
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        config: Config,
        config_path: Option<PathBuf>,
        toolchain: Toolchain,
        git: GitInfo,
        code: CodeInfo,
        catalog: &ArchCatalog,
        arch_override: &[String],
        runner: Arc<dyn ProcessRunner>,
    ) -> anyhow::Result<Self> {
        let selectors = if arch_override.is_empty() {
            config.build.arch_selectors()
        } else {
            arch_override.to_vec()
        };
        let archs = catalog.resolve(&selectors)?;

        let mut ldflags_vars = config.build.ldflags_vars.clone();
        ldflags_vars.insert("main.version".to_string(), code.version.to_string());
        ldflags_vars.insert("main.buildDate".to_string(), code.build_date.to_rfc3339());
        ldflags_vars.insert(
            "main.commit".to_string(),
            git.commit.clone().unwrap_or_default(),
        );

        let executables: Vec<ExecutableInfo> =
            discover_mains(&code.base_dir, &code.module, &config.project.main_file_names)?
                .into_iter()
                .map(|found| {
                    let name = match (&config.project.name, found.relative.as_str()) {
                        (Some(name), ".") => name.clone(),
                        _ => found.name,
                    };
                    ExecutableInfo {
                        name,
                        path: found.path,
                        package: found.package,
                        archs: archs.clone(),
                        cgo: config.build.cgo,
                        build_args: config.build.build_args.clone(),
                        ldflags: config.build.ldflags(),
                        ldflags_vars: ldflags_vars.clone(),
                        publish: found.publish,
                    }
                })
                .collect();

        info!(
            module = %code.module,
            version = %code.version,
            executables = executables.len(),
            archs = archs.len(),
            "project loaded"
        );

        let namer = ArtifactNamer::new(&code.base_dir, &config.build.output_dir);

        Ok(Self {
            config,
            config_path,
            toolchain,
            git,
            code,
            archs,
            executables,
            namer,
            runner,
        })
    }

    /// Fail when the installed toolchain is older than go.mod requires
    pub fn check_toolchain(&self) -> anyhow::Result<()> {
        self.toolchain
            .check_min_version(self.code.min_go_version.as_ref())?;
        Ok(())
    }

    /// Register the base targets and the build/zip grids, then seal
    pub fn targets(&self) -> anyhow::Result<TargetGraph> {
        let mut registry = TargetRegistry::new();

        registry.register(names::GENERATE, no_deps(), self.run_inline(self.toolchain.generate()))?;
        registry.register(names::TEST, no_deps(), self.run_inline(self.toolchain.test()))?;

        let output_dir = self.namer.output_dir().to_path_buf();
        registry.register(
            names::CLEAN_ZIP,
            no_deps(),
            action(move || {
                let removed = clean_archives(&output_dir)?;
                debug!(removed, "cleaned archives");
                Ok(())
            }),
        )?;

        let runner = self.runner.clone();
        let toolchain = self.toolchain.clone();
        registry.register(
            names::LICENSES,
            no_deps(),
            action(move || {
                let deps = LicenseScanner::run(runner.as_ref(), &toolchain)?;
                for line in report_lines(&deps) {
                    println!("{}", line);
                }
                Ok(())
            }),
        )?;

        let grid: Vec<GridExecutable> = self
            .executables
            .iter()
            .map(|e| GridExecutable::new(&e.name, &e.path))
            .collect();
        let by_name: Arc<BTreeMap<String, ExecutableInfo>> = Arc::new(
            self.executables
                .iter()
                .map(|e| (e.name.clone(), e.clone()))
                .collect(),
        );

        synthesize_build_and_package(
            &mut registry,
            &grid,
            &self.archs,
            self.build_factory(by_name.clone()),
            self.package_factory(by_name),
            &[names::CLEAN_ZIP],
        )?;

        registry.register(
            names::ALL,
            [gantry_targets::BUILD_ACTIVITY, names::TEST, gantry_targets::PACKAGE_ACTIVITY],
            None,
        )?;

        Ok(registry.seal())
    }

    fn run_inline(&self, spec: gantry_toolchain::CommandSpec) -> Option<Action> {
        let runner = self.runner.clone();
        action(move || {
            runner.run_inline(&spec)?;
            Ok(())
        })
    }

    fn build_factory(
        &self,
        executables: Arc<BTreeMap<String, ExecutableInfo>>,
    ) -> impl Fn(&GridExecutable, &str) -> Action + 'static {
        let runner = self.runner.clone();
        let toolchain = self.toolchain.clone();
        let namer = self.namer.clone();

        move |exec: &GridExecutable, arch: &str| -> Action {
            let runner = runner.clone();
            let toolchain = toolchain.clone();
            let executables = executables.clone();
            let output = namer.binary_path(&exec.name, arch);
            let name = exec.name.clone();
            let arch = arch.to_string();

            Box::new(move || {
                let info = executables
                    .get(&name)
                    .with_context(|| format!("unknown executable {}", name))?;
                let spec = toolchain.build(&BuildRequest {
                    executable: info,
                    arch: &arch,
                    output: &output,
                });
                runner.run_inline(&spec)?;
                Ok(())
            })
        }
    }

    fn package_factory(
        &self,
        executables: Arc<BTreeMap<String, ExecutableInfo>>,
    ) -> impl Fn(&GridExecutable, &str) -> Action + 'static {
        let namer = self.namer.clone();
        let version = self.code.version.clone();

        move |exec: &GridExecutable, arch: &str| -> Action {
            let publish = executables
                .get(&exec.name)
                .map(|e| e.publish)
                .unwrap_or(false);
            let binary = namer.binary_path(&exec.name, arch);
            let archive = namer.archive_path(&exec.name, &version, arch);

            Box::new(move || {
                if !publish {
                    debug!(binary = %binary.display(), "not published, skipping archive");
                    return Ok(());
                }
                zip_executable(&binary, &archive)?;
                Ok(())
            })
        }
    }

    /// Default target from the configuration
    pub fn default_target(&self) -> &str {
        &self.config.run.default_target
    }
}

fn no_deps() -> Vec<&'static str> {
    Vec::new()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::DateTime;
    use gantry_core::ToolchainError;
    use gantry_targets::{CollectingReporter, Executor, RunError};
    use gantry_toolchain::{CommandSpec, GoVersion};
    use semver::Version;
    use tempfile::TempDir;

    /// Records inline commands; fails any command whose args contain `fail_on`
    #[derive(Default)]
    pub(crate) struct RecordingRunner {
        pub calls: Mutex<Vec<CommandSpec>>,
        pub fail_on: Option<String>,
        pub inline_count: AtomicUsize,
    }

    impl ProcessRunner for RecordingRunner {
        fn run_inline(&self, spec: &CommandSpec) -> gantry_toolchain::Result<()> {
            self.inline_count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(spec.clone());
            match &self.fail_on {
                Some(needle) if spec.args.iter().any(|a| a.contains(needle.as_str())) => {
                    Err(ToolchainError::CommandFailed {
                        command: spec.display(),
                        reason: "exited with code 2".to_string(),
                    })
                }
                _ => Ok(()),
            }
        }

        fn capture_output(&self, spec: &CommandSpec) -> gantry_toolchain::Result<String> {
            Err(ToolchainError::CommandFailed {
                command: spec.display(),
                reason: "not scripted".to_string(),
            })
        }
    }

    const DIST_LIST: &str = "darwin/arm64\nfreebsd/amd64\nlinux/amd64\nlinux/arm64\nnetbsd/amd64\nopenbsd/amd64\nplan9/amd64\nwindows/amd64\n";

    fn fixture(dir: &Path) {
        for rel in ["cmd/server/main.go", "cmd/cli/main.go", "examples/demo/main.go"] {
            let path = dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "package main\n").unwrap();
        }
    }

    pub(crate) fn project_with(
        dir: &Path,
        config: Config,
        runner: Arc<dyn ProcessRunner>,
    ) -> Project {
        let git = GitInfo {
            tag: Some(Version::new(1, 2, 0)),
            commit: Some("0123456789abcdef".to_string()),
            commit_date: Some(DateTime::parse_from_rfc3339("2024-02-03T04:05:06Z").unwrap()),
        };
        let code = CodeInfo::derive(
            dir.to_path_buf(),
            "github.com/acme/widget".to_string(),
            Some(Version::new(1, 21, 0)),
            &git,
            Local::now().fixed_offset(),
        )
        .unwrap();
        let toolchain = Toolchain::new(
            "go",
            GoVersion::parse_output("go version go1.22.0 linux/amd64").unwrap(),
        );

        Project::assemble(
            config,
            None,
            toolchain,
            git,
            code,
            &ArchCatalog::parse(DIST_LIST),
            &[],
            runner,
        )
        .unwrap()
    }

    fn linux_config() -> Config {
        let mut config = Config::default();
        config.build.archs = Some(vec!["linux".to_string()]);
        config
    }

    #[test]
    fn test_assemble_discovers_executables() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        let project = project_with(temp.path(), linux_config(), Arc::new(RecordingRunner::default()));

        let names: Vec<_> = project.executables.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["cli", "server", "demo"]);
        assert_eq!(project.archs, vec!["linux/amd64", "linux/arm64"]);

        let server = &project.executables[1];
        assert_eq!(server.package, "github.com/acme/widget/cmd/server");
        assert_eq!(server.ldflags_vars["main.version"], "1.2.0");
        assert_eq!(server.ldflags_vars["main.commit"], "0123456789abcdef");
        assert_eq!(server.ldflags_vars["main.buildDate"], "2024-02-03T04:05:06+00:00");
        assert!(server.publish);
        assert!(!project.executables[2].publish);
    }

    #[test]
    fn test_default_archs_are_os_families() {
        let temp = TempDir::new().unwrap();
        let project = project_with(temp.path(), Config::default(), Arc::new(RecordingRunner::default()));
        assert_eq!(
            project.archs,
            vec![
                "darwin/arm64",
                "freebsd/amd64",
                "linux/amd64",
                "linux/arm64",
                "netbsd/amd64",
                "openbsd/amd64",
                "windows/amd64",
            ]
        );
    }

    #[test]
    fn test_explicit_empty_archs_select_everything() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.archs = Some(Vec::new());
        let project = project_with(temp.path(), config, Arc::new(RecordingRunner::default()));
        assert!(project.archs.contains(&"plan9/amd64".to_string()));
        assert_eq!(project.archs.len(), 8);
    }

    #[test]
    fn test_target_graph_shape() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        let project = project_with(temp.path(), linux_config(), Arc::new(RecordingRunner::default()));
        let graph = project.targets().unwrap();

        for name in [
            "generate",
            "test",
            "clean-zip",
            "licenses",
            "build",
            "build:server",
            "build:server:linux/arm64",
            "zip",
            "zip:cli:linux/amd64",
            "all",
        ] {
            assert!(graph.lookup(name).is_some(), "missing target {}", name);
        }

        let all: Vec<_> = graph
            .lookup("all")
            .unwrap()
            .dependencies()
            .iter()
            .map(|d| d.as_str())
            .collect();
        assert_eq!(all, vec!["build", "test", "zip"]);

        let zip_leaf = graph.lookup("zip:cli:linux/amd64").unwrap();
        assert_eq!(zip_leaf.dependencies()[0].as_str(), "build:cli:linux/amd64");
        assert_eq!(
            graph.lookup("zip").unwrap().dependencies()[0].as_str(),
            "clean-zip"
        );
    }

    #[test]
    fn test_build_leaf_runs_go_build() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        let runner = Arc::new(RecordingRunner::default());
        let project = project_with(temp.path(), linux_config(), runner.clone());
        let graph = project.targets().unwrap();

        Executor::new(&graph, Arc::new(CollectingReporter::default()))
            .run("build:server:linux/arm64")
            .unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let spec = &calls[0];
        assert!(spec.env.contains(&("GOARCH".to_string(), "arm64".to_string())));
        let output_idx = spec.args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(
            PathBuf::from(&spec.args[output_idx + 1]),
            temp.path().join("build/linux/arm64/server")
        );
    }

    #[test]
    fn test_zip_packages_built_binaries() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        let project = project_with(temp.path(), linux_config(), Arc::new(RecordingRunner::default()));
        let graph = project.targets().unwrap();

        // The recording runner does not compile, so lay the binaries out by hand
        for exec in ["cli", "server", "demo"] {
            for arch in ["linux/amd64", "linux/arm64"] {
                let binary = project.namer.binary_path(exec, arch);
                fs::create_dir_all(binary.parent().unwrap()).unwrap();
                fs::write(binary, b"binary").unwrap();
            }
        }
        let stale = temp.path().join("build/old-0.1.0-linux_amd64.zip");
        fs::write(&stale, b"").unwrap();

        Executor::new(&graph, Arc::new(CollectingReporter::default()))
            .run("zip")
            .unwrap();

        assert!(!stale.exists());
        assert!(temp.path().join("build/server-1.2.0-linux_arm64.zip").exists());
        assert!(temp.path().join("build/cli-1.2.0-linux_amd64.zip").exists());
        assert!(!temp.path().join("build/demo-1.2.0-linux_amd64.zip").exists());
    }

    #[test]
    fn test_run_stops_at_failing_build() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        let runner = Arc::new(RecordingRunner {
            fail_on: Some("cmd/cli".to_string()),
            ..Default::default()
        });
        let project = project_with(temp.path(), linux_config(), runner.clone());
        let graph = project.targets().unwrap();

        let err = Executor::new(&graph, Arc::new(CollectingReporter::default()))
            .run("all")
            .unwrap_err();

        match err {
            RunError::ActionFailed { target, position, .. } => {
                assert_eq!(target.as_str(), "build:cli:linux/amd64");
                assert_eq!(position, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(runner.inline_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_root_executable_uses_project_name() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.go"), "package main\n").unwrap();
        let mut config = linux_config();
        config.project.name = Some("widgetd".to_string());

        let project = project_with(temp.path(), config, Arc::new(RecordingRunner::default()));
        assert_eq!(project.executables.len(), 1);
        assert_eq!(project.executables[0].name, "widgetd");
        assert_eq!(project.executables[0].package, "github.com/acme/widget");
    }

    #[test]
    fn test_toolchain_gate() {
        let temp = TempDir::new().unwrap();
        let project = project_with(temp.path(), linux_config(), Arc::new(RecordingRunner::default()));
        assert!(project.check_toolchain().is_ok());

        let mut old = project_with(temp.path(), linux_config(), Arc::new(RecordingRunner::default()));
        old.code.min_go_version = Some(Version::new(1, 30, 0));
        assert!(old.check_toolchain().is_err());
    }
}
