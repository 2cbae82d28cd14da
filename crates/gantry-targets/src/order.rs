//! Execution order resolution
//!
//! Depth-first walk over the dependency lists with three marks per target.
//! A dependency reached while still on the current path is a cycle; one that
//! is already done is skipped, so diamonds are scheduled once. Aggregators are
//! walked but never emitted.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::registry::TargetGraph;
use crate::target::TargetName;

/// Errors during order resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The root or a referenced dependency is not registered
    #[error("unknown target: {0}")]
    UnknownTarget(TargetName),

    /// A target was reached again while it was still being visited
    #[error("cycle identified in targets graph (at {target})")]
    Cycle { target: TargetName },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Ordered list of action-bearing targets for one root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    root: TargetName,
    steps: Vec<TargetName>,
}

impl ExecutionPlan {
    /// The requested root target
    pub fn root(&self) -> &TargetName {
        &self.root
    }

    /// Targets to execute, in order
    pub fn steps(&self) -> &[TargetName] {
        &self.steps
    }

    /// Iterate over the targets to execute
    pub fn iter(&self) -> impl Iterator<Item = &TargetName> {
        self.steps.iter()
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing needs to run
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether a target is scheduled
    pub fn contains(&self, name: &str) -> bool {
        self.steps.iter().any(|s| s.as_str() == name)
    }

    /// Zero-based position of a target in the plan
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.as_str() == name)
    }

    /// Human-readable listing of the plan
    pub fn describe(&self) -> String {
        let mut out = format!("Plan for {} ({} steps):\n", self.root, self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("  {:>3}. {}\n", i + 1, step));
        }
        out
    }
}

/// Resolve the run order for `root`
#[instrument(skip(graph), fields(targets = graph.len()))]
pub fn resolve(graph: &TargetGraph, root: &str) -> Result<ExecutionPlan, ResolveError> {
    let mut marks: HashMap<TargetName, Mark> = HashMap::new();
    let mut steps = Vec::new();

    visit(graph, &mut marks, &mut steps, root)?;

    debug!(root, steps = steps.len(), "resolved execution order");
    Ok(ExecutionPlan {
        root: TargetName::from(root),
        steps,
    })
}

fn visit(
    graph: &TargetGraph,
    marks: &mut HashMap<TargetName, Mark>,
    steps: &mut Vec<TargetName>,
    name: &str,
) -> Result<(), ResolveError> {
    match marks.get(name) {
        Some(Mark::InProgress) => {
            return Err(ResolveError::Cycle {
                target: TargetName::from(name),
            })
        }
        Some(Mark::Done) => return Ok(()),
        None => {}
    }

    let target = graph
        .lookup(name)
        .ok_or_else(|| ResolveError::UnknownTarget(TargetName::from(name)))?;

    marks.insert(target.name().clone(), Mark::InProgress);

    for dep in target.dependencies() {
        visit(graph, marks, steps, dep.as_str())?;
    }

    if !target.is_aggregator() {
        steps.push(target.name().clone());
    }

    marks.insert(target.name().clone(), Mark::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TargetRegistry;
    use crate::target::action;

    fn leaf(registry: &mut TargetRegistry, name: &str, deps: &[&str]) {
        registry
            .register(name, deps.iter().copied(), action(|| Ok(())))
            .unwrap();
    }

    fn names(plan: &ExecutionPlan) -> Vec<&str> {
        plan.iter().map(TargetName::as_str).collect()
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "package", &["build"]);
        leaf(&mut registry, "build", &["generate"]);
        leaf(&mut registry, "generate", &[]);
        let graph = registry.seal();

        let plan = graph.resolve("package").unwrap();
        assert_eq!(names(&plan), vec!["generate", "build", "package"]);
    }

    #[test]
    fn test_diamond_scheduled_once() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "A", &[]);
        leaf(&mut registry, "B", &["A"]);
        leaf(&mut registry, "C", &["A"]);
        leaf(&mut registry, "D", &["B", "C"]);
        let graph = registry.seal();

        let plan = graph.resolve("D").unwrap();
        assert_eq!(names(&plan), vec!["A", "B", "C", "D"]);
        assert_eq!(plan.iter().filter(|n| n.as_str() == "A").count(), 1);
    }

    #[test]
    fn test_sibling_order_follows_dependency_list() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "x", &[]);
        leaf(&mut registry, "y", &[]);
        leaf(&mut registry, "z", &[]);
        registry.register("first", ["z", "x", "y"], None).unwrap();
        registry.register("second", ["y", "z", "x"], None).unwrap();
        let graph = registry.seal();

        assert_eq!(names(&graph.resolve("first").unwrap()), vec!["z", "x", "y"]);
        assert_eq!(names(&graph.resolve("second").unwrap()), vec!["y", "z", "x"]);
    }

    #[test]
    fn test_duplicate_dependency_entries() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "build", &[]);
        leaf(&mut registry, "zip", &["build", "build"]);
        let graph = registry.seal();

        assert_eq!(names(&graph.resolve("zip").unwrap()), vec!["build", "zip"]);
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "loop", &["loop"]);
        let graph = registry.seal();

        let err = graph.resolve("loop").unwrap_err();
        assert_eq!(
            err,
            ResolveError::Cycle {
                target: "loop".into()
            }
        );
    }

    #[test]
    fn test_transitive_cycle_detected() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "a", &["b"]);
        registry.register("b", ["c"], None).unwrap();
        leaf(&mut registry, "c", &["a"]);
        let graph = registry.seal();

        assert!(matches!(
            graph.resolve("a"),
            Err(ResolveError::Cycle { .. })
        ));
        assert!(matches!(
            graph.resolve("b"),
            Err(ResolveError::Cycle { .. })
        ));
    }

    #[test]
    fn test_unknown_root() {
        let graph = TargetRegistry::new().seal();
        let err = graph.resolve("missing").unwrap_err();
        assert_eq!(err, ResolveError::UnknownTarget("missing".into()));
        assert_eq!(err.to_string(), "unknown target: missing");
    }

    #[test]
    fn test_unknown_dependency_reported_lazily() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "ok", &[]);
        leaf(&mut registry, "broken", &["ok", "ghost"]);
        let graph = registry.seal();

        assert!(graph.resolve("ok").is_ok());
        assert_eq!(
            graph.resolve("broken").unwrap_err(),
            ResolveError::UnknownTarget("ghost".into())
        );
    }

    #[test]
    fn test_aggregator_root_not_emitted() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "build", &[]);
        leaf(&mut registry, "test", &[]);
        registry.register("all", ["build", "test"], None).unwrap();
        let graph = registry.seal();

        let plan = graph.resolve("all").unwrap();
        assert_eq!(names(&plan), vec!["build", "test"]);
        assert!(!plan.contains("all"));
        assert_eq!(plan.root().as_str(), "all");
    }

    #[test]
    fn test_aggregator_is_transparent() {
        // An aggregator in the middle of the graph still schedules its subtree
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "leaf", &[]);
        registry.register("group", ["leaf"], None).unwrap();
        leaf(&mut registry, "top", &["group"]);
        let graph = registry.seal();

        let plan = graph.resolve("top").unwrap();
        assert_eq!(names(&plan), vec!["leaf", "top"]);
    }

    #[test]
    fn test_empty_aggregator_yields_empty_plan() {
        let mut registry = TargetRegistry::new();
        registry
            .register("build:app", Vec::<TargetName>::new(), None)
            .unwrap();
        let graph = registry.seal();

        let plan = graph.resolve("build:app").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "step-0", &[]);
        for i in 1..500 {
            let prev = format!("step-{}", i - 1);
            leaf(&mut registry, &format!("step-{}", i), &[prev.as_str()]);
        }
        let graph = registry.seal();

        let plan = graph.resolve("step-499").unwrap();
        assert_eq!(plan.len(), 500);
        assert_eq!(plan.position("step-0"), Some(0));
        assert_eq!(plan.position("step-499"), Some(499));
    }

    #[test]
    fn test_describe_lists_steps() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "generate", &[]);
        let graph = registry.seal();

        let text = graph.resolve("generate").unwrap().describe();
        assert!(text.contains("Plan for generate (1 steps)"));
        assert!(text.contains("1. generate"));
    }

    #[test]
    fn test_plan_serializes_as_json() {
        let mut registry = TargetRegistry::new();
        leaf(&mut registry, "generate", &[]);
        leaf(&mut registry, "test", &["generate"]);
        let graph = registry.seal();

        let value = serde_json::to_value(graph.resolve("test").unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "root": "test", "steps": ["generate", "test"] })
        );
    }
}
