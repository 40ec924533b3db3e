//! Design document model
//!
//! A [`Document`] owns the list of root components. Each root is a tree of
//! [`Node`]s identified by hierarchical [`NodeId`]s. Virtual nodes live in the
//! tree unexpanded; their embedded copies are produced by [`crate::component`].

pub mod id;
pub mod load;
pub mod node;
pub mod packages;

pub use id::{IdError, NodeId};
pub use node::{
    Attribute, AttributeValue, Attributes, ComponentRef, Constraint, ConstraintPackage,
    ConstraintType, Node, NodeKind, Reference, ReferenceKind, Relation,
};
pub use packages::PackageError;

/// The root list of a design document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub roots: Vec<Node>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Find any node by id
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// Find any node by id, mutably
    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.roots.iter_mut().find_map(|root| root.find_mut(id))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Append a new root component, assigning it the next free root id
    pub fn add_root(&mut self, mut node: Node) -> Result<NodeId, IdError> {
        let next = next_index(self.roots.iter().map(|r| &r.id));
        let id = NodeId::root(next)?;
        reassign_ids(&mut node, id.clone())?;
        self.roots.push(node);
        Ok(id)
    }

    /// Append `node` under `parent_id`, assigning it (and its subtree) fresh ids.
    ///
    /// Returns `Ok(None)` when the parent does not exist.
    pub fn insert_child(
        &mut self,
        parent_id: &NodeId,
        mut node: Node,
    ) -> Result<Option<NodeId>, IdError> {
        let Some(parent) = self.find_mut(parent_id) else {
            return Ok(None);
        };
        let next = next_index(parent.children.iter().map(|c| &c.id));
        let id = parent.id.child(next)?;
        reassign_ids(&mut node, id.clone())?;
        parent.children.push(node);
        Ok(Some(id))
    }

    /// Insert a component reference (virtual node) under `parent_id`
    pub fn insert_component_reference(
        &mut self,
        parent_id: &NodeId,
        referenced_root_id: NodeId,
        reference_type: impl Into<String>,
    ) -> Result<Option<NodeId>, IdError> {
        // The id is replaced on insertion.
        let node =
            Node::component_reference(NodeId::viewport(), referenced_root_id, reference_type);
        self.insert_child(parent_id, node)
    }

    /// Detach and return a node with its subtree. Sibling ids are left as-is.
    pub fn remove(&mut self, id: &NodeId) -> Option<Node> {
        if let Some(index) = self.roots.iter().position(|r| &r.id == id) {
            return Some(self.roots.remove(index));
        }
        let parent = self.find_mut(&id.parent()?)?;
        let index = parent.children.iter().position(|c| &c.id == id)?;
        Some(parent.children.remove(index))
    }
}

/// Regenerate ids for `node` and its subtree, rooted at `id`, preserving
/// sibling order. Calls `on_rename(old, new)` for every node renamed.
pub fn renumber(
    node: &mut Node,
    id: NodeId,
    on_rename: &mut impl FnMut(&NodeId, &NodeId),
) -> Result<(), IdError> {
    on_rename(&node.id, &id);
    node.id = id;
    for (index, child) in node.children.iter_mut().enumerate() {
        let child_id = node.id.child(index + 1)?;
        renumber(child, child_id, on_rename)?;
    }
    Ok(())
}

fn reassign_ids(node: &mut Node, id: NodeId) -> Result<(), IdError> {
    renumber(node, id, &mut |_, _| {})
}

fn next_index<'a>(ids: impl Iterator<Item = &'a NodeId>) -> usize {
    ids.map(NodeId::last_index).max().unwrap_or(0) + 1
}
