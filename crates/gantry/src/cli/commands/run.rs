//! Run command: execute a target and its dependencies

use std::io::Write;
use std::sync::{Arc, Mutex};

use clap::Args;
use console::style;
use tracing::{info, warn};

use gantry_targets::{Executor, ReporterSet, RunEvent, RunReporter, TracingReporter};

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Run a target and everything it depends on
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Target to run (defaults to the configured default target)
    pub target: Option<String>,

    /// Show the execution plan without running anything
    #[arg(long)]
    pub dry_run: bool,
}

impl RunCommand {
    /// Execute the run command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = cli.load_project()?;
        let target = self
            .target
            .clone()
            .unwrap_or_else(|| project.default_target().to_string());
        info!(root = %target, dry_run = self.dry_run, "executing run command");

        let graph = project.targets()?;

        if self.dry_run {
            let plan = graph.resolve(&target)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
                OutputFormat::Text => {
                    println!("{}", plan.describe());
                    if !cli.quiet {
                        output::warning("dry run, nothing executed");
                    }
                }
            }
            return Ok(());
        }

        project.check_toolchain()?;

        let mut reporters = ReporterSet::new().with(Arc::new(TracingReporter));
        if !cli.quiet && cli.format == OutputFormat::Text {
            reporters = reporters.with(Arc::new(ConsoleReporter::stdout()));
        }

        let summary = Executor::new(&graph, Arc::new(reporters)).run(&target)?;

        match cli.format {
            OutputFormat::Json => {
                let result = serde_json::json!({
                    "target": summary.root,
                    "executed": summary.executed,
                    "duration_ms": summary.duration.as_millis(),
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Text if !cli.quiet => {
                output::success(&format!(
                    "{} complete: {} in {:.1}s",
                    style(&summary.root).bold(),
                    output::count(summary.executed.len(), "target"),
                    summary.duration.as_secs_f64()
                ));
            }
            OutputFormat::Text => {}
        }

        Ok(())
    }
}

/// Prints `[HH:MM:SS i/n]` progress lines
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleReporter {
    /// Reporter writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Reporter writing to any sink
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

/// The progress line for an event, if it gets one
pub fn format_event(event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::Started {
            target,
            position,
            total,
            at,
        } => Some(format!(
            "[{} {}/{}] Executing target {}",
            at.format("%H:%M:%S"),
            position,
            total,
            style(target).bold()
        )),
        RunEvent::Failed {
            target,
            position,
            total,
            at,
            error,
        } => Some(format!(
            "[{} {}/{}] {} executing target {}: {}",
            at.format("%H:%M:%S"),
            position,
            total,
            style("ERROR").red().bold(),
            target,
            error
        )),
        // blank separator between targets
        RunEvent::Completed { .. } => Some(String::new()),
        RunEvent::Planned { .. } | RunEvent::Finished { .. } => None,
    }
}

impl RunReporter for ConsoleReporter {
    fn report(&self, event: &RunEvent) {
        let Some(line) = format_event(event) else {
            return;
        };
        let Ok(mut out) = self.out.lock() else {
            warn!("progress output lock poisoned");
            return;
        };
        if let Err(err) = writeln!(out, "{}", line).and_then(|()| out.flush()) {
            warn!(error = %err, "failed to write progress line");
        }
    }
}
