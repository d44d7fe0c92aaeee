//! Directed graph of nodes with static and conditional edges.

use crate::{Node, NodeName};
use quill_core::WorkingState;
use quill_error::{WorkflowError, WorkflowErrorKind};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Where an edge leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Another node
    Node(NodeName),
    /// Stop the run
    End,
}

impl From<NodeName> for Target {
    fn from(node: NodeName) -> Self {
        Target::Node(node)
    }
}

/// Predicate over working state.
pub type Guard = Arc<dyn Fn(&WorkingState) -> bool + Send + Sync>;

/// Ordered predicate table; the first matching guard wins.
#[derive(Clone)]
pub struct Router {
    routes: Vec<(&'static str, Guard, Target)>,
    default: Target,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<_> = self.routes.iter().map(|(l, _, t)| (*l, *t)).collect();
        f.debug_struct("Router")
            .field("routes", &labels)
            .field("default", &self.default)
            .finish()
    }
}

impl Router {
    /// Router that goes to `default` when no guard matches.
    pub fn new(default: impl Into<Target>) -> Self {
        Self {
            routes: Vec::new(),
            default: default.into(),
        }
    }

    /// Add a labelled route, checked after the ones already added.
    pub fn route(
        mut self,
        label: &'static str,
        guard: impl Fn(&WorkingState) -> bool + Send + Sync + 'static,
        target: impl Into<Target>,
    ) -> Self {
        self.routes.push((label, Arc::new(guard), target.into()));
        self
    }

    fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.routes
            .iter()
            .map(|(_, _, t)| *t)
            .chain(std::iter::once(self.default))
    }

    fn pick(&self, state: &WorkingState) -> (&'static str, Target) {
        self.routes
            .iter()
            .find(|(_, guard, _)| guard(state))
            .map_or(("default", self.default), |(label, _, target)| (*label, *target))
    }
}

#[derive(Debug, Clone)]
enum Edge {
    Static(Target),
    Conditional(Router),
}

/// Graph under construction.
///
/// Problems are collected and reported together by [`WorkflowGraph::compile`].
#[derive(Default)]
pub struct WorkflowGraph {
    nodes: HashMap<NodeName, Arc<dyn Node>>,
    edges: HashMap<NodeName, Edge>,
    duplicates: Vec<NodeName>,
    entry: Option<NodeName>,
}

impl WorkflowGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under its own name.
    pub fn add_node(&mut self, node: impl Node + 'static) -> &mut Self {
        self.nodes.insert(node.name(), Arc::new(node));
        self
    }

    /// Node the run starts at.
    pub fn set_entry(&mut self, node: NodeName) -> &mut Self {
        self.entry = Some(node);
        self
    }

    /// Unconditional edge.
    pub fn add_edge(&mut self, from: NodeName, to: impl Into<Target>) -> &mut Self {
        self.insert_edge(from, Edge::Static(to.into()))
    }

    /// Predicate table evaluated after `from` completes.
    pub fn add_conditional_edges(&mut self, from: NodeName, router: Router) -> &mut Self {
        self.insert_edge(from, Edge::Conditional(router))
    }

    fn insert_edge(&mut self, from: NodeName, edge: Edge) -> &mut Self {
        if self.edges.insert(from, edge).is_some() {
            self.duplicates.push(from);
        }
        self
    }

    /// Validate and freeze the graph.
    ///
    /// # Errors
    ///
    /// - [`WorkflowErrorKind::NoEntryPoint`] if no entry was set
    /// - [`WorkflowErrorKind::DuplicateEdge`] if a node was given two edge sets
    /// - [`WorkflowErrorKind::UnknownNode`] if an edge or the entry names an
    ///   unregistered node
    /// - [`WorkflowErrorKind::MissingEdge`] if a node has nowhere to go
    pub fn compile(self) -> Result<CompiledGraph, WorkflowError> {
        let entry = self
            .entry
            .ok_or_else(|| WorkflowError::new(WorkflowErrorKind::NoEntryPoint))?;
        if let Some(node) = self.duplicates.first() {
            return Err(WorkflowError::new(WorkflowErrorKind::DuplicateEdge(
                node.to_string(),
            )));
        }

        let known: HashSet<NodeName> = self.nodes.keys().copied().collect();
        let unknown = |node: &NodeName| {
            (!known.contains(node))
                .then(|| WorkflowError::new(WorkflowErrorKind::UnknownNode(node.to_string())))
        };
        if let Some(err) = unknown(&entry) {
            return Err(err);
        }
        for (from, edge) in &self.edges {
            if let Some(err) = unknown(from) {
                return Err(err);
            }
            let targets: Vec<Target> = match edge {
                Edge::Static(target) => vec![*target],
                Edge::Conditional(router) => router.targets().collect(),
            };
            for target in targets {
                if let Target::Node(to) = target
                    && let Some(err) = unknown(&to)
                {
                    return Err(err);
                }
            }
        }
        let mut names: Vec<&NodeName> = self.nodes.keys().collect();
        names.sort();
        if let Some(node) = names.into_iter().find(|n| !self.edges.contains_key(*n)) {
            return Err(WorkflowError::new(WorkflowErrorKind::MissingEdge(
                node.to_string(),
            )));
        }

        tracing::debug!(nodes = self.nodes.len(), entry = %entry, "Workflow graph compiled");
        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
        })
    }
}

/// Validated graph, ready to run.
pub struct CompiledGraph {
    nodes: HashMap<NodeName, Arc<dyn Node>>,
    edges: HashMap<NodeName, Edge>,
    entry: NodeName,
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("nodes", &self.nodes.len())
            .field("entry", &self.entry)
            .finish()
    }
}

impl CompiledGraph {
    /// First node of a run.
    pub fn entry(&self) -> NodeName {
        self.entry
    }

    /// Node registered as `name`.
    pub fn node(&self, name: NodeName) -> Result<Arc<dyn Node>, WorkflowError> {
        self.nodes
            .get(&name)
            .cloned()
            .ok_or_else(|| WorkflowError::new(WorkflowErrorKind::UnknownNode(name.to_string())))
    }

    /// Where to go after `from`, given the state it left behind.
    pub fn next(&self, from: NodeName, state: &WorkingState) -> Result<Target, WorkflowError> {
        match self.edges.get(&from) {
            Some(Edge::Static(target)) => Ok(*target),
            Some(Edge::Conditional(router)) => {
                let (label, target) = router.pick(state);
                tracing::debug!(from = %from, route = label, to = ?target, "Routed");
                Ok(target)
            }
            None => Err(WorkflowError::new(WorkflowErrorKind::MissingEdge(
                from.to_string(),
            ))),
        }
    }
}
