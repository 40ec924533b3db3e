//! Error types for the layout solver
//!
//! Only [`LayoutError::CyclicDependency`] and [`LayoutError::UnknownRoot`] abort
//! a pass. Everything else is collected as a diagnostic while the pass carries
//! on with the remaining constraints and nodes.

use thiserror::Error;

use crate::component::ComponentError;
use crate::document::{Attribute, NodeId, Relation};

/// Errors that can occur during layout computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Dependency cycle; names the node that closed it
    #[error("cyclic layout dependency through node '{node_id}'")]
    CyclicDependency { node_id: NodeId },

    /// A constraint references a node that cannot be resolved
    #[error("constraint '{constraint_id}' on node '{node_id}' references missing node '{reference}'")]
    ReferenceNotFound {
        node_id: NodeId,
        constraint_id: String,
        reference: NodeId,
    },

    /// A relation the evaluator does not honor for this attribute
    #[error("constraint '{constraint_id}' on node '{node_id}': {relation} is not supported for {attribute}")]
    UnsupportedRelation {
        node_id: NodeId,
        constraint_id: String,
        attribute: Attribute,
        relation: Relation,
    },

    /// The component requested for solving does not exist
    #[error("no component with id '{id}'")]
    UnknownRoot { id: NodeId },

    /// Virtual node expansion failure
    #[error(transparent)]
    Component(#[from] ComponentError),
}

impl LayoutError {
    /// Whether this error aborts the current solve pass
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LayoutError::CyclicDependency { .. } | LayoutError::UnknownRoot { .. }
        )
    }

    /// The node the error is attached to, if any
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            LayoutError::CyclicDependency { node_id }
            | LayoutError::ReferenceNotFound { node_id, .. }
            | LayoutError::UnsupportedRelation { node_id, .. } => Some(node_id),
            LayoutError::UnknownRoot { id } => Some(id),
            LayoutError::Component(e) => e.node_id(),
        }
    }
}
