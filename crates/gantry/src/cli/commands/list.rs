//! List command

use clap::Args;
use console::style;
use tracing::info;

use gantry_targets::TargetGraph;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// List registered targets
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Hide per-architecture leaves
    #[arg(long)]
    pub top_level: bool,
}

impl ListCommand {
    /// Execute the list command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing list command");
        let project = cli.load_project()?;
        let graph = project.targets()?;

        match cli.format {
            OutputFormat::Json => {
                let targets: Vec<_> = visible(&graph, self.top_level)
                    .map(|t| {
                        serde_json::json!({
                            "name": t.name(),
                            "dependencies": t.dependencies(),
                            "action": !t.is_aggregator(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&targets)?);
            }
            OutputFormat::Text => {
                println!("{}", output::section("Targets", Some(graph.len())));
                for target in visible(&graph, self.top_level) {
                    let kind = if target.is_aggregator() {
                        style("group").dim()
                    } else {
                        style("action").green()
                    };
                    let deps: Vec<&str> =
                        target.dependencies().iter().map(|d| d.as_str()).collect();
                    if deps.is_empty() {
                        println!("  {} [{}]", output::target(target.name()), kind);
                    } else {
                        println!(
                            "  {} [{}] -> {}",
                            output::target(target.name()),
                            kind,
                            deps.join(", ")
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

/// Targets in registration order; `top_level` drops `<activity>:<exec>:<arch>` leaves
fn visible(
    graph: &TargetGraph,
    top_level: bool,
) -> impl Iterator<Item = &gantry_targets::Target> {
    graph
        .targets()
        .iter()
        .filter(move |t| !top_level || t.name().as_str().matches(':').count() < 2)
}
