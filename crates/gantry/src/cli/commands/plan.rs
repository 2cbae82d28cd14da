//! Plan command: show what a run would execute

use clap::Args;
use tracing::info;

use crate::cli::{Cli, OutputFormat};

/// Show the execution plan for a target
#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Target to plan (defaults to the configured default target)
    pub target: Option<String>,
}

impl PlanCommand {
    /// Execute the plan command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = cli.load_project()?;
        let target = self
            .target
            .as_deref()
            .unwrap_or_else(|| project.default_target());
        info!(root = target, "executing plan command");

        let plan = project.targets()?.resolve(target)?;

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            OutputFormat::Text => println!("{}", plan.describe()),
        }

        Ok(())
    }
}
