//! Licenses command

use std::sync::Arc;

use clap::Args;
use tracing::info;

use gantry_targets::{Executor, TracingReporter};

use crate::project::names;
use crate::cli::Cli;

/// Report the licenses of every module dependency
#[derive(Debug, Args)]
pub struct LicensesCommand {}

impl LicensesCommand {
    /// Execute the licenses command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing licenses command");
        let project = cli.load_project()?;
        project.check_toolchain()?;

        let graph = project.targets()?;
        Executor::new(&graph, Arc::new(TracingReporter)).run(names::LICENSES)?;
        Ok(())
    }
}
