//! Info command: show what was probed about the project

use clap::Args;
use console::style;
use tracing::info;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Show project metadata
#[derive(Debug, Args)]
pub struct InfoCommand {}

impl InfoCommand {
    /// Execute the info command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing info command");
        let project = cli.load_project()?;
        let go = project.toolchain.version();

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "config_path": project.config_path,
                    "code": project.code,
                    "git": project.git,
                    "go": {
                        "path": project.toolchain.go(),
                        "version": go.version.to_string(),
                        "host": format!("{}/{}", go.os, go.arch),
                    },
                    "archs": project.archs,
                    "executables": project.executables,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("{}", output::section("Project", None));
                println!("{}", output::field("Module", &project.code.module));
                println!("{}", output::field("Version", output::version(&project.code.version)));
                println!(
                    "{}",
                    output::field("Commit", project.git.commit.as_deref().unwrap_or("unknown"))
                );
                println!(
                    "{}",
                    output::field("Build date", project.code.build_date.to_rfc3339())
                );
                let config = match &project.config_path {
                    Some(path) => output::path(path),
                    None => "defaults".to_string(),
                };
                println!("{}", output::field("Config", config));
                println!();

                println!("{}", output::section("Toolchain", None));
                println!("{}", output::field("Go", &go.version));
                println!("{}", output::field("Host", format!("{}/{}", go.os, go.arch)));
                if let Some(min) = &project.code.min_go_version {
                    println!("{}", output::field("Requires", min));
                }
                println!();

                println!(
                    "{}",
                    output::section("Executables", Some(project.executables.len()))
                );
                for exec in &project.executables {
                    let publish = if exec.publish {
                        String::new()
                    } else {
                        style(" (not published)").dim().to_string()
                    };
                    println!("  {} {}{}", style(&exec.name).bold(), exec.package, publish);
                }
                if project.executables.is_empty() {
                    output::warning("no executables found");
                }
                println!();

                output::info(&format!(
                    "{}: {}",
                    output::count(project.archs.len(), "architecture"),
                    project.archs.join(", ")
                ));
            }
        }

        Ok(())
    }
}
