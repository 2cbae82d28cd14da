//! Target registration and the sealed target graph

use std::collections::HashMap;

use tracing::{debug, info};

use crate::order::{self, ExecutionPlan, ResolveError};
use crate::target::{Action, Target, TargetName};

/// Errors raised while populating a registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A target with this name was already registered
    #[error("Target already exists: {0}")]
    DuplicateTarget(TargetName),

    /// A handle refers to a target that is not in this registry
    #[error("Unknown target handle: {0}")]
    UnknownHandle(TargetName),
}

/// Handle to a registered target, used to append dependencies during setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHandle {
    name: TargetName,
}

impl TargetHandle {
    /// Name of the registered target
    pub fn name(&self) -> &TargetName {
        &self.name
    }
}

/// Append-only set of targets, populated once during setup.
///
/// Dependency names are not checked here; an unknown name only surfaces when
/// the resolver reaches it. Call [`TargetRegistry::seal`] to obtain the
/// read-only [`TargetGraph`] used for resolution and execution.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    index: HashMap<TargetName, usize>,
}

impl TargetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new target
    pub fn register<N, D>(
        &mut self,
        name: N,
        dependencies: D,
        action: Option<Action>,
    ) -> Result<TargetHandle, RegistryError>
    where
        N: Into<TargetName>,
        D: IntoIterator,
        D::Item: Into<TargetName>,
    {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTarget(name));
        }

        let dependencies: Vec<TargetName> = dependencies.into_iter().map(Into::into).collect();
        debug!(
            target_name = %name,
            dependencies = dependencies.len(),
            aggregator = action.is_none(),
            "registering target"
        );

        self.index.insert(name.clone(), self.targets.len());
        self.targets
            .push(Target::new(name.clone(), dependencies, action));

        Ok(TargetHandle { name })
    }

    /// Append a dependency to an already registered target
    pub fn append_dependency(
        &mut self,
        handle: &TargetHandle,
        dependency: impl Into<TargetName>,
    ) -> Result<(), RegistryError> {
        let idx = *self
            .index
            .get(&handle.name)
            .ok_or_else(|| RegistryError::UnknownHandle(handle.name.clone()))?;
        self.targets[idx].dependencies.push(dependency.into());
        Ok(())
    }

    /// Look up a target by name
    pub fn lookup(&self, name: &str) -> Option<&Target> {
        self.index.get(name).map(|&idx| &self.targets[idx])
    }

    /// Whether a target with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Freeze the registry. No target can be added or changed afterwards.
    pub fn seal(self) -> TargetGraph {
        info!(target_count = self.targets.len(), "target registry sealed");
        TargetGraph {
            targets: self.targets,
            index: self.index,
        }
    }
}

/// Immutable view of all registered targets
#[derive(Debug)]
pub struct TargetGraph {
    targets: Vec<Target>,
    index: HashMap<TargetName, usize>,
}

impl TargetGraph {
    /// Look up a target by name
    pub fn lookup(&self, name: &str) -> Option<&Target> {
        self.index.get(name).map(|&idx| &self.targets[idx])
    }

    /// All targets, in registration order
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// All target names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &TargetName> {
        self.targets.iter().map(Target::name)
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the graph has no targets
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Compute the execution plan for a root target
    pub fn resolve(&self, root: &str) -> Result<ExecutionPlan, ResolveError> {
        order::resolve(self, root)
    }
}
