//! Gantry Targets - Target graph and execution engine
//!
//! This crate provides the target registry, dependency-ordered plan
//! resolution, executable × architecture grid synthesis, and the sequential
//! executor that runs a plan and stops at the first failure.

pub mod executor;
pub mod grid;
pub mod order;
pub mod registry;
pub mod reporter;
pub mod target;

pub use executor::{Executor, RunError, RunSummary};
pub use grid::{
    synthesize_build_and_package, Activity, GridExecutable, GridSynthesizer, BUILD_ACTIVITY,
    PACKAGE_ACTIVITY,
};
pub use order::{resolve, ExecutionPlan, ResolveError};
pub use registry::{RegistryError, TargetGraph, TargetHandle, TargetRegistry};
pub use reporter::{CollectingReporter, ReporterSet, RunEvent, RunReporter, TracingReporter};
pub use target::{action, Action, Target, TargetName};
