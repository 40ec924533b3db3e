//! Dependency graph construction
//!
//! Every node depends on its parent container (unless the parent is the
//! viewport, which is always resolved first) and on every node referenced by a
//! constraint in its default package. Edges read "must be resolved before".

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::trace;

use crate::document::NodeId;

use super::arena::NodeArena;

/// node -> the nodes it depends on
pub type DependencyGraph = BTreeMap<NodeId, BTreeSet<NodeId>>;

/// Walks the arena below a root and records dependency edges
pub struct GraphBuilder<'a> {
    arena: &'a NodeArena,
    pub graph: DependencyGraph,
    visited: HashSet<NodeId>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        Self {
            arena,
            graph: DependencyGraph::new(),
            visited: HashSet::new(),
        }
    }

    /// Visit `root` and everything below it. Nodes already visited are skipped.
    pub fn visit(&mut self, root: &NodeId) {
        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            if !self.visited.insert(id.clone()) {
                continue;
            }
            let Some(node) = self.arena.get(&id) else {
                continue;
            };

            let deps = self.graph.entry(id.clone()).or_default();
            if let Some(parent) = node.parent.as_ref().filter(|p| !p.is_viewport()) {
                deps.insert(parent.clone());
            }
            for reference in node.constraints.iter().filter_map(|c| c.referenced_node()) {
                trace!(node = %id, reference = %reference, "reference edge");
                deps.insert(reference.clone());
            }

            stack.extend(node.children.iter().rev().cloned());
        }
    }

    pub fn finish(self) -> DependencyGraph {
        self.graph
    }
}

/// Build the dependency graph for the subtree at `root`
pub fn build(root: &NodeId, arena: &NodeArena) -> DependencyGraph {
    let mut builder = GraphBuilder::new(arena);
    builder.visit(root);
    builder.finish()
}
