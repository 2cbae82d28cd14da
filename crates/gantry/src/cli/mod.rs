//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{
    ArchsCommand, CompletionsCommand, InfoCommand, LicensesCommand, ListCommand, PlanCommand,
    RunCommand,
};

use crate::project::Project;

/// Gantry - Cross-compile, package and orchestrate Go project builds
#[derive(Debug, Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// OS/ARCH selectors overriding the configuration (repeatable)
    #[arg(long = "arch", global = true)]
    pub archs: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a target and everything it depends on
    Run(RunCommand),

    /// Show the execution plan for a target
    Plan(PlanCommand),

    /// List registered targets
    List(ListCommand),

    /// Show the architectures a selection resolves to
    Archs(ArchsCommand),

    /// Report dependency licenses
    Licenses(LicensesCommand),

    /// Show project metadata
    Info(InfoCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Run(ref cmd) => cmd.execute(&self),
            Commands::Plan(ref cmd) => cmd.execute(&self),
            Commands::List(ref cmd) => cmd.execute(&self),
            Commands::Archs(ref cmd) => cmd.execute(&self),
            Commands::Licenses(ref cmd) => cmd.execute(&self),
            Commands::Info(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Probe the project in the current directory
    pub fn load_project(&self) -> anyhow::Result<Project> {
        let cwd = std::env::current_dir()?;
        Project::load(&cwd, &self.archs)
    }
}
