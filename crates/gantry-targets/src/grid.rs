//! Grid synthesis: executables × architectures → target trees
//!
//! Each activity (e.g. "build", "zip") expands into:
//!
//! ```text
//! build                      aggregator, one dep per executable
//! └── build:<exec>           aggregator, one dep per architecture
//!     └── build:<exec>:<arch>  leaf carrying the action
//! ```
//!
//! An activity may be cross-wired to another so that each of its leaves
//! depends on the other's leaf for the same executable and architecture.

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::registry::{RegistryError, TargetRegistry};
use crate::target::{Action, TargetName};

/// An executable discovered in the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridExecutable {
    /// Display name, used as the target name segment
    pub name: String,
    /// Source directory of the executable
    pub path: PathBuf,
}

impl GridExecutable {
    /// Create a new executable descriptor
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Produces the action for one executable/architecture pair
pub type ActionFactory = Box<dyn Fn(&GridExecutable, &str) -> Action>;

/// One category of per-executable, per-architecture work
pub struct Activity {
    name: TargetName,
    top_level_dependencies: Vec<TargetName>,
    leaf_dependency_on: Option<TargetName>,
    factory: ActionFactory,
}

impl Activity {
    /// Create an activity whose leaves run the actions built by `factory`
    pub fn new<F>(name: impl Into<TargetName>, factory: F) -> Self
    where
        F: Fn(&GridExecutable, &str) -> Action + 'static,
    {
        Self {
            name: name.into(),
            top_level_dependencies: Vec::new(),
            leaf_dependency_on: None,
            factory: Box::new(factory),
        }
    }

    /// Add a dependency to the top-level aggregator (before the executables)
    pub fn with_top_level_dependency(mut self, dep: impl Into<TargetName>) -> Self {
        self.top_level_dependencies.push(dep.into());
        self
    }

    /// Make every leaf depend on the matching leaf of another activity
    pub fn after_activity(mut self, activity: impl Into<TargetName>) -> Self {
        self.leaf_dependency_on = Some(activity.into());
        self
    }

    /// Activity name (also the top-level target name)
    pub fn name(&self) -> &TargetName {
        &self.name
    }
}

impl std::fmt::Debug for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activity")
            .field("name", &self.name)
            .field("top_level_dependencies", &self.top_level_dependencies)
            .field("leaf_dependency_on", &self.leaf_dependency_on)
            .finish()
    }
}

/// Expands activities across executables and architectures
#[derive(Debug)]
pub struct GridSynthesizer<'a> {
    executables: &'a [GridExecutable],
    archs: &'a [String],
    activities: Vec<Activity>,
}

impl<'a> GridSynthesizer<'a> {
    /// Create a synthesizer over the given axes
    pub fn new(executables: &'a [GridExecutable], archs: &'a [String]) -> Self {
        Self {
            executables,
            archs,
            activities: Vec::new(),
        }
    }

    /// Add an activity
    pub fn activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Register all grid targets into `registry`
    #[instrument(skip_all, fields(executables = self.executables.len(), archs = self.archs.len()))]
    pub fn synthesize(self, registry: &mut TargetRegistry) -> Result<(), RegistryError> {
        let mut leaves = 0usize;

        for activity in &self.activities {
            let top = registry.register(
                activity.name.clone(),
                activity.top_level_dependencies.iter().cloned(),
                None,
            )?;

            for exec in self.executables {
                let exec_target = registry.register(
                    top.name().join(&exec.name),
                    Vec::<TargetName>::new(),
                    None,
                )?;
                registry.append_dependency(&top, exec_target.name().clone())?;

                for arch in self.archs {
                    let dependencies: Vec<TargetName> = activity
                        .leaf_dependency_on
                        .iter()
                        .map(|other| other.join(&exec.name).join(arch))
                        .collect();

                    // The factory receives this pair by reference and must
                    // move what it needs into the action it returns.
                    let action = (activity.factory)(exec, arch);

                    let leaf = registry.register(
                        exec_target.name().join(arch),
                        dependencies,
                        Some(action),
                    )?;
                    registry.append_dependency(&exec_target, leaf.name().clone())?;
                    leaves += 1;
                }
            }

            debug!(activity = %activity.name, "activity grid registered");
        }

        info!(
            activities = self.activities.len(),
            leaves, "target grid synthesized"
        );
        Ok(())
    }
}

/// Register the standard `build` and `zip` grids.
///
/// Every `zip:<exec>:<arch>` leaf depends on `build:<exec>:<arch>`; the `zip`
/// aggregator additionally depends on `zip_top_level_deps` (e.g. a cleanup
/// target) before any executable.
pub fn synthesize_build_and_package<B, P>(
    registry: &mut TargetRegistry,
    executables: &[GridExecutable],
    archs: &[String],
    build: B,
    package: P,
    zip_top_level_deps: &[&str],
) -> Result<(), RegistryError>
where
    B: Fn(&GridExecutable, &str) -> Action + 'static,
    P: Fn(&GridExecutable, &str) -> Action + 'static,
{
    let mut zip = Activity::new(PACKAGE_ACTIVITY, package).after_activity(BUILD_ACTIVITY);
    for dep in zip_top_level_deps {
        zip = zip.with_top_level_dependency(*dep);
    }

    GridSynthesizer::new(executables, archs)
        .activity(Activity::new(BUILD_ACTIVITY, build))
        .activity(zip)
        .synthesize(registry)
}

/// Name of the build activity
pub const BUILD_ACTIVITY: &str = "build";

/// Name of the packaging activity
pub const PACKAGE_ACTIVITY: &str = "zip";
