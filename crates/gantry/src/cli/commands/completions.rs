//! Shell completion scripts

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::Shell;
use tracing::info;

use crate::cli::{output, Cli};

/// Print a completion script for the gantry CLI
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, "generating completions");

        let Some(path) = &self.output else {
            return write_completions(self.shell, &mut io::stdout().lock());
        };

        write_completions(self.shell, &mut File::create(path)?)?;
        if !cli.quiet {
            output::success(&format!("Completions written to {}", output::path(path)));
        }
        Ok(())
    }
}

/// Completion script for `shell`, covering every subcommand and global flag
fn write_completions(shell: Shell, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin, out);
    out.flush()?;
    Ok(())
}
