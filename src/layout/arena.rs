//! Per-pass node cache
//!
//! Flattens a concrete (fully expanded) tree into an arena indexed by id, with
//! the synthetic viewport node `00` as the parent of the solved root. Only the
//! default package's constraints are retained; other packages are inert.

use std::collections::HashMap;

use tracing::warn;

use crate::document::{Constraint, Node, NodeId};

/// One node as the solver sees it
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaNode {
    pub id: NodeId,
    /// `None` only for the viewport
    pub parent: Option<NodeId>,
    pub node_type: String,
    pub constraints: Vec<Constraint>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<ArenaNode>,
    index: HashMap<NodeId, usize>,
}

impl NodeArena {
    /// Arena holding only the viewport
    pub fn new() -> Self {
        let mut arena = Self::default();
        arena.push(ArenaNode {
            id: NodeId::viewport(),
            parent: None,
            node_type: "Viewport".to_string(),
            constraints: Vec::new(),
            children: Vec::new(),
        });
        arena
    }

    /// Flatten `root` in pre-order beneath the viewport.
    ///
    /// A repeated id keeps its first occurrence.
    pub fn from_tree(root: &Node) -> Self {
        let mut arena = Self::new();
        arena.insert_subtree(root, NodeId::viewport());
        arena
    }

    fn insert_subtree(&mut self, node: &Node, parent: NodeId) {
        if self.index.contains_key(&node.id) {
            warn!(node = %node.id, "duplicate node id in layout tree; keeping first");
            return;
        }
        if let Some(&parent_index) = self.index.get(&parent) {
            self.nodes[parent_index].children.push(node.id.clone());
        }
        self.push(ArenaNode {
            id: node.id.clone(),
            parent: Some(parent),
            node_type: node.node_type.clone(),
            constraints: node.default_constraints().to_vec(),
            children: Vec::new(),
        });
        for child in &node.children {
            self.insert_subtree(child, node.id.clone());
        }
    }

    fn push(&mut self, node: ArenaNode) {
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    pub fn get(&self, id: &NodeId) -> Option<&ArenaNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Node ids in insertion (pre-order) order, viewport first
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArenaNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
