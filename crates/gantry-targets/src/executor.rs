//! Sequential plan executor
//!
//! Runs the resolved plan one target at a time and stops at the first
//! failing action. Nothing after the failure is attempted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::instrument;

use crate::order::{ExecutionPlan, ResolveError};
use crate::registry::TargetGraph;
use crate::reporter::{RunEvent, RunReporter};
use crate::target::TargetName;

/// Errors from a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The plan could not be computed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A target's action failed
    #[error("target {target} failed ({position}/{total}): {source:#}")]
    ActionFailed {
        target: TargetName,
        position: usize,
        total: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl RunError {
    /// Name of the failed target, if an action failed
    pub fn failed_target(&self) -> Option<&TargetName> {
        match self {
            Self::ActionFailed { target, .. } => Some(target),
            Self::Resolve(_) => None,
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Requested root
    pub root: TargetName,
    /// Targets executed, in order
    pub executed: Vec<TargetName>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Executes plans against a sealed target graph
pub struct Executor<'g> {
    graph: &'g TargetGraph,
    reporter: Arc<dyn RunReporter>,
}

impl<'g> Executor<'g> {
    /// Create a new executor
    pub fn new(graph: &'g TargetGraph, reporter: Arc<dyn RunReporter>) -> Self {
        Self { graph, reporter }
    }

    /// Compute the plan for `root` without running anything
    pub fn plan(&self, root: &str) -> Result<ExecutionPlan, ResolveError> {
        self.graph.resolve(root)
    }

    /// Resolve and run `root`
    #[instrument(skip(self))]
    pub fn run(&self, root: &str) -> Result<RunSummary, RunError> {
        let plan = self.plan(root)?;
        self.execute(&plan)
    }

    /// Run an already resolved plan
    pub fn execute(&self, plan: &ExecutionPlan) -> Result<RunSummary, RunError> {
        let start = Instant::now();
        let total = plan.len();

        self.reporter.report(&RunEvent::Planned {
            root: plan.root().clone(),
            total,
        });

        let mut executed = Vec::with_capacity(total);

        for (idx, name) in plan.iter().enumerate() {
            let position = idx + 1;
            let target = self
                .graph
                .lookup(name.as_str())
                .ok_or_else(|| ResolveError::UnknownTarget(name.clone()))?;

            self.reporter.report(&RunEvent::Started {
                target: name.clone(),
                position,
                total,
                at: Local::now(),
            });

            let step_start = Instant::now();
            if let Err(source) = target.invoke() {
                self.reporter.report(&RunEvent::Failed {
                    target: name.clone(),
                    position,
                    total,
                    at: Local::now(),
                    error: format!("{:#}", source),
                });
                return Err(RunError::ActionFailed {
                    target: name.clone(),
                    position,
                    total,
                    source,
                });
            }

            self.reporter.report(&RunEvent::Completed {
                target: name.clone(),
                position,
                total,
                duration: step_start.elapsed(),
            });
            executed.push(name.clone());
        }

        let duration = start.elapsed();
        self.reporter
            .report(&RunEvent::Finished { total, duration });

        Ok(RunSummary {
            root: plan.root().clone(),
            executed,
            duration,
        })
    }
}
