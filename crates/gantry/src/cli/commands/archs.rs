//! Archs command: show how selectors resolve

use clap::Args;
use tracing::info;

use gantry_core::config::load_config_or_default;
use gantry_toolchain::{ArchCatalog, Console, Toolchain};

use crate::cli::{Cli, OutputFormat};

/// Show the architectures a selection resolves to
#[derive(Debug, Args)]
pub struct ArchsCommand {
    /// Selectors (`linux`, `linux/amd64`); defaults to `--arch` or the configuration
    pub selectors: Vec<String>,

    /// List every architecture the toolchain supports
    #[arg(long, conflicts_with = "selectors")]
    pub all: bool,
}

impl ArchsCommand {
    /// Execute the archs command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(selectors = ?self.selectors, "executing archs command");
        let cwd = std::env::current_dir()?;

        let console = Console::new(&cwd);
        let toolchain = Toolchain::detect(&console)?;
        let catalog = ArchCatalog::probe(&console, toolchain.go())?;

        let selectors = if self.all {
            Vec::new()
        } else if !self.selectors.is_empty() {
            self.selectors.clone()
        } else if !cli.archs.is_empty() {
            cli.archs.clone()
        } else {
            let (config, _) = load_config_or_default(&cwd)?;
            config.build.arch_selectors()
        };

        let archs = catalog.resolve(&selectors)?;

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&archs)?),
            OutputFormat::Text => {
                for arch in &archs {
                    println!("{}", arch);
                }
            }
        }

        Ok(())
    }
}
