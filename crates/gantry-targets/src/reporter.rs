//! Run progress reporting

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::target::TargetName;

/// Events emitted while executing a plan.
///
/// Positions are 1-based (`position` of `total`).
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// The plan for a root target was computed
    Planned { root: TargetName, total: usize },
    /// A target is about to run
    Started {
        target: TargetName,
        position: usize,
        total: usize,
        at: DateTime<Local>,
    },
    /// A target finished successfully
    Completed {
        target: TargetName,
        position: usize,
        total: usize,
        duration: Duration,
    },
    /// A target's action failed; the run stops here
    Failed {
        target: TargetName,
        position: usize,
        total: usize,
        at: DateTime<Local>,
        error: String,
    },
    /// Every target in the plan succeeded
    Finished { total: usize, duration: Duration },
}

/// Receives run events
pub trait RunReporter {
    /// Handle a run event
    fn report(&self, event: &RunEvent);
}

/// Reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl RunReporter for TracingReporter {
    fn report(&self, event: &RunEvent) {
        match event {
            RunEvent::Planned { root, total } => {
                tracing::info!(root = %root, steps = total, "execution plan ready");
            }
            RunEvent::Started {
                target,
                position,
                total,
                ..
            } => {
                tracing::info!("[{}/{}] Executing target {}", position, total, target);
            }
            RunEvent::Completed {
                target, duration, ..
            } => {
                tracing::debug!(
                    "{} completed in {:.1}s",
                    target,
                    duration.as_secs_f64()
                );
            }
            RunEvent::Failed {
                target,
                position,
                total,
                error,
                ..
            } => {
                tracing::error!(
                    "[{}/{}] ERROR executing target {}: {}",
                    position,
                    total,
                    target,
                    error
                );
            }
            RunEvent::Finished { total, duration } => {
                tracing::info!(
                    "{} targets complete ({:.1}s)",
                    total,
                    duration.as_secs_f64()
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<RunEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl RunReporter for CollectingReporter {
    fn report(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Broadcasts events to several reporters
#[derive(Default)]
pub struct ReporterSet {
    reporters: Vec<Arc<dyn RunReporter>>,
}

impl ReporterSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reporter
    pub fn with(mut self, reporter: Arc<dyn RunReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Number of reporters
    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl RunReporter for ReporterSet {
    fn report(&self, event: &RunEvent) {
        for reporter in &self.reporters {
            reporter.report(event);
        }
    }
}
