//! Virtual node expansion - embeds remapped copies of referenced components

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::document::{renumber, Document, Node, NodeId, NodeKind};

use super::registry::{CachedExpansion, ComponentError, ExpansionCache};

/// Expands virtual nodes into concrete subtrees and owns their cache
#[derive(Debug, Default)]
pub struct ComponentResolver {
    cache: ExpansionCache,
}

impl ComponentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &ExpansionCache {
        &self.cache
    }

    /// Expand one virtual node into a concrete subtree rooted at its own id.
    ///
    /// The copy's descendants get fresh ids under the virtual node's id, are
    /// marked as virtual children, and have internal references remapped.
    /// References leaving the copied subtree are redirected to the viewport.
    /// The virtual node's attributes are merged over the copy's root and its
    /// constraint packages, if any, replace the root's.
    ///
    /// A referenced root that is itself a reference is followed to the
    /// concrete component it mirrors, and its own overrides are applied
    /// beneath the virtual node's.
    pub fn expand(&mut self, node: &Node, document: &Document) -> Result<Node, ComponentError> {
        let Some(component) = node.component_ref() else {
            return Err(ComponentError::InvalidVirtualNode {
                node_id: node.id.clone(),
                reason: "not a component reference".to_string(),
            });
        };

        let cached = self
            .cache
            .get(&node.id)
            .filter(|e| e.referenced_root_id == component.referenced_root_id)
            .map(|e| e.subtree.clone());

        let mut expanded = match cached {
            Some(subtree) => subtree,
            None => {
                let (source, aliases) =
                    follow_references(node, &component.referenced_root_id, document)?;
                let mut subtree = remap_copy(source, &node.id)?;
                for alias in aliases.iter().rev() {
                    apply_overrides(&mut subtree, alias);
                }
                let via: Vec<NodeId> = aliases
                    .iter()
                    .filter_map(|alias| alias.component_ref())
                    .map(|r| r.referenced_root_id.clone())
                    .collect();
                debug!(
                    virtual_id = %node.id,
                    root = %component.referenced_root_id,
                    via = ?via.iter().map(NodeId::as_str).collect::<Vec<_>>(),
                    "expanded component reference"
                );
                self.cache.insert(
                    node.id.clone(),
                    CachedExpansion {
                        referenced_root_id: component.referenced_root_id.clone(),
                        via,
                        subtree: subtree.clone(),
                    },
                );
                subtree
            }
        };

        apply_overrides(&mut expanded, node);
        Ok(expanded)
    }

    /// Produce a copy of `root` with every virtual node replaced by its expansion.
    ///
    /// Failed expansions become empty placeholders and are reported through
    /// `diagnostics`; the rest of the tree is unaffected.
    pub fn expand_tree(
        &mut self,
        root: &Node,
        document: &Document,
        diagnostics: &mut Vec<ComponentError>,
    ) -> Node {
        let mut chain = vec![root.id.clone()];
        self.resolve_node(root, document, &mut chain, diagnostics)
    }

    fn resolve_node(
        &mut self,
        node: &Node,
        document: &Document,
        chain: &mut Vec<NodeId>,
        diagnostics: &mut Vec<ComponentError>,
    ) -> Node {
        let Some(component) = node.component_ref() else {
            let mut resolved = node.clone();
            resolved.children = node
                .children
                .iter()
                .map(|child| self.resolve_node(child, document, chain, diagnostics))
                .collect();
            return resolved;
        };

        let root_id = component.referenced_root_id.clone();
        if chain.contains(&root_id) {
            let mut cycle = chain.clone();
            cycle.push(root_id);
            let err = ComponentError::CircularReference {
                virtual_id: node.id.clone(),
                chain: cycle,
            };
            warn!("{}", err);
            diagnostics.push(err);
            return placeholder(node);
        }

        match self.expand(node, document) {
            Ok(expanded) => {
                let depth = chain.len();
                chain.push(root_id);
                if let Some(entry) = self.cache.get(&node.id) {
                    chain.extend(entry.via.iter().cloned());
                }
                let resolved = self.resolve_node(&expanded, document, chain, diagnostics);
                chain.truncate(depth);
                resolved
            }
            Err(err) => {
                warn!("{}", err);
                diagnostics.push(err);
                placeholder(node)
            }
        }
    }

    /// Check a virtual node before committing an edit
    pub fn validate(&self, node: &Node, document: &Document) -> Result<(), ComponentError> {
        let invalid = |reason: String| ComponentError::InvalidVirtualNode {
            node_id: node.id.clone(),
            reason,
        };
        let Some(component) = node.component_ref() else {
            return Err(invalid("not a component reference".to_string()));
        };
        if node.node_type.trim().is_empty() {
            return Err(invalid("node type is empty".to_string()));
        }
        if component.reference_type.trim().is_empty() {
            return Err(invalid("reference type is empty".to_string()));
        }
        let root_id = &component.referenced_root_id;
        if !document.contains(root_id) {
            return Err(invalid(format!("referenced component '{}' does not exist", root_id)));
        }
        if root_id == &node.id || root_id.is_ancestor_of(&node.id) {
            return Err(invalid(format!(
                "referenced component '{}' contains the reference itself",
                root_id
            )));
        }
        Ok(())
    }

    /// Purge every expansion of `root_id`; returns the virtual ids to re-render
    pub fn on_referenced_root_changed(&mut self, root_id: &NodeId) -> Vec<NodeId> {
        let purged = self.cache.purge_root(root_id);
        debug!(root = %root_id, purged = purged.len(), "invalidated component expansions");
        purged
    }

    /// Purge the expansion of a removed virtual node and those nested in it
    pub fn on_virtual_node_removed(&mut self, virtual_id: &NodeId) -> bool {
        self.cache.remove(virtual_id)
    }
}

/// The concrete component behind `root_id`, plus every component root that
/// is itself a reference met on the way, outermost first
fn follow_references<'d>(
    node: &Node,
    root_id: &NodeId,
    document: &'d Document,
) -> Result<(&'d Node, Vec<&'d Node>), ComponentError> {
    let mut chain = vec![root_id.clone()];
    let mut aliases = Vec::new();
    let mut current = root_id;
    loop {
        let source = document
            .find(current)
            .ok_or_else(|| ComponentError::ReferenceNotFound {
                virtual_id: node.id.clone(),
                referenced_root_id: current.clone(),
            })?;
        let Some(next) = source.component_ref() else {
            return Ok((source, aliases));
        };
        let next = &next.referenced_root_id;
        if chain.contains(next) {
            chain.push(next.clone());
            return Err(ComponentError::CircularReference {
                virtual_id: node.id.clone(),
                chain,
            });
        }
        chain.push(next.clone());
        aliases.push(source);
        current = next;
    }
}

/// Deep-copy `source`, re-rooted at `new_root`, with ids and references remapped
fn remap_copy(source: &Node, new_root: &NodeId) -> Result<Node, ComponentError> {
    let mut copy = source.clone();
    let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();
    renumber(&mut copy, new_root.clone(), &mut |old, new| {
        id_map.insert(old.clone(), new.clone());
    })
    .map_err(|e| ComponentError::InvalidVirtualNode {
        node_id: new_root.clone(),
        reason: e.to_string(),
    })?;

    for child in &mut copy.children {
        mark_virtual_children(child);
    }
    remap_references(&mut copy, &id_map);
    Ok(copy)
}

fn mark_virtual_children(node: &mut Node) {
    node.is_virtual_child = true;
    for child in &mut node.children {
        mark_virtual_children(child);
    }
}

fn remap_references(node: &mut Node, id_map: &HashMap<NodeId, NodeId>) {
    for constraint in node.constraints_mut() {
        if let Some(reference) = constraint.reference.as_mut() {
            reference.node_id = id_map
                .get(&reference.node_id)
                .cloned()
                .unwrap_or_else(NodeId::viewport);
        }
    }
    for child in &mut node.children {
        remap_references(child, id_map);
    }
}

fn apply_overrides(expanded: &mut Node, virtual_node: &Node) {
    expanded.is_virtual_child = virtual_node.is_virtual_child;
    for (key, value) in &virtual_node.attributes {
        expanded.attributes.insert(key.clone(), value.clone());
    }
    if !virtual_node.constraint_packages.is_empty() {
        expanded.constraint_packages = virtual_node.constraint_packages.clone();
    }
}

/// Stand-in for a virtual node that could not be expanded
fn placeholder(node: &Node) -> Node {
    let mut empty = node.clone();
    empty.kind = NodeKind::Plain;
    empty.children.clear();
    empty
}
