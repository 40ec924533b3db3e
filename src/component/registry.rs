//! Expansion cache for virtual nodes

use std::collections::HashMap;

use thiserror::Error;

use crate::document::{Node, NodeId};

/// Errors that can occur while expanding or validating virtual nodes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComponentError {
    /// The referenced component root does not exist
    #[error("virtual node '{virtual_id}' references missing component '{referenced_root_id}'")]
    ReferenceNotFound {
        virtual_id: NodeId,
        referenced_root_id: NodeId,
    },

    /// Rejected by explicit validation
    #[error("invalid virtual node '{node_id}': {reason}")]
    InvalidVirtualNode { node_id: NodeId, reason: String },

    /// Expansion would embed a component inside itself
    #[error("circular component reference at '{virtual_id}': {}", format_chain(.chain))]
    CircularReference {
        virtual_id: NodeId,
        chain: Vec<NodeId>,
    },
}

fn format_chain(chain: &[NodeId]) -> String {
    chain
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ComponentError {
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            ComponentError::ReferenceNotFound { virtual_id, .. }
            | ComponentError::CircularReference { virtual_id, .. } => Some(virtual_id),
            ComponentError::InvalidVirtualNode { node_id, .. } => Some(node_id),
        }
    }
}

/// A remapped copy of a component, before per-instance overrides
#[derive(Debug, Clone)]
pub struct CachedExpansion {
    pub referenced_root_id: NodeId,
    /// Roots reached by following component roots that are themselves
    /// references, in the order they were followed
    pub via: Vec<NodeId>,
    pub subtree: Node,
}

impl CachedExpansion {
    /// Whether the copy was built from `root_id`, directly or through `via`
    pub fn mirrors(&self, root_id: &NodeId) -> bool {
        &self.referenced_root_id == root_id || self.via.contains(root_id)
    }
}

/// Long-lived expansion cache keyed by virtual node id.
///
/// Solve passes never clear it; entries go away only through
/// [`ExpansionCache::purge_root`] and [`ExpansionCache::remove`].
#[derive(Debug, Default)]
pub struct ExpansionCache {
    entries: HashMap<NodeId, CachedExpansion>,
}

impl ExpansionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, virtual_id: &NodeId) -> Option<&CachedExpansion> {
        self.entries.get(virtual_id)
    }

    pub fn insert(&mut self, virtual_id: NodeId, expansion: CachedExpansion) {
        self.entries.insert(virtual_id, expansion);
    }

    pub fn contains(&self, virtual_id: &NodeId) -> bool {
        self.entries.contains_key(virtual_id)
    }

    /// Drop every entry mirroring `root_id`; returns the affected virtual ids, sorted
    pub fn purge_root(&mut self, root_id: &NodeId) -> Vec<NodeId> {
        let mut purged: Vec<NodeId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.mirrors(root_id))
            .map(|(id, _)| id.clone())
            .collect();
        purged.sort();
        for id in &purged {
            self.entries.remove(id);
        }
        purged
    }

    /// Drop the entry for `virtual_id` and every expansion nested inside it.
    ///
    /// Returns whether anything was dropped.
    pub fn remove(&mut self, virtual_id: &NodeId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|id, _| id != virtual_id && !virtual_id.is_ancestor_of(id));
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
