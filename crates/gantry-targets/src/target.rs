//! Target types

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a target, unique within a registry.
///
/// Names are opaque to the engine. Synthesized grids follow a
/// colon-separated convention (`build`, `build:app`, `build:app:linux/amd64`)
/// which [`TargetName::join`] produces, but nothing ever parses it back.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetName(String);

impl TargetName {
    /// Create a new target name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Append a colon-separated segment (e.g. `build` + `app` = `build:app`)
    pub fn join(&self, segment: &str) -> Self {
        Self(format!("{}:{}", self.0, segment))
    }

    /// Borrow the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TargetName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TargetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TargetName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&String> for TargetName {
    fn from(name: &String) -> Self {
        Self(name.clone())
    }
}

impl From<&TargetName> for TargetName {
    fn from(name: &TargetName) -> Self {
        name.clone()
    }
}

/// The work a target performs when executed
pub type Action = Box<dyn Fn() -> anyhow::Result<()>>;

/// Wrap a closure as an [`Action`]
pub fn action<F>(f: F) -> Option<Action>
where
    F: Fn() -> anyhow::Result<()> + 'static,
{
    Some(Box::new(f))
}

/// A named unit of work with ordered dependencies and an optional action.
///
/// Targets without an action are aggregators: they are walked for their
/// dependencies but never scheduled themselves.
pub struct Target {
    pub(crate) name: TargetName,
    pub(crate) dependencies: Vec<TargetName>,
    pub(crate) action: Option<Action>,
}

impl Target {
    pub(crate) fn new(name: TargetName, dependencies: Vec<TargetName>, action: Option<Action>) -> Self {
        Self {
            name,
            dependencies,
            action,
        }
    }

    /// Target name
    pub fn name(&self) -> &TargetName {
        &self.name
    }

    /// Dependency names, in traversal order
    pub fn dependencies(&self) -> &[TargetName] {
        &self.dependencies
    }

    /// Whether this target only groups other targets
    pub fn is_aggregator(&self) -> bool {
        self.action.is_none()
    }

    /// Run the target's action. Aggregators succeed trivially.
    pub fn invoke(&self) -> anyhow::Result<()> {
        match &self.action {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}
