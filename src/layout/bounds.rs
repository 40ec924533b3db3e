//! Absolute bounds lookup
//!
//! A node can be queried by a referencing node before, during or after its own
//! solve step, so lookup falls through several sources. First hit wins:
//!
//! 1. the viewport `00` is the render surface at (0, 0)
//! 2. a layout box from the current pass, placed inside the parent's absolute bounds
//! 3. an absolute measurement from the renderer
//! 4. a parent-relative measurement from the renderer, offset by the parent
//! 5. the node's declared size at the origin

use std::collections::HashMap;

use tracing::trace;

use crate::document::{Attribute, ConstraintType, NodeId, Relation};

use super::arena::NodeArena;
use super::config::LayoutConfig;
use super::renderer::{Measurement, Renderer};
use super::types::{LayoutBox, Rect};

pub struct BoundsResolver<'a> {
    config: &'a LayoutConfig,
    arena: &'a NodeArena,
    layouts: &'a HashMap<NodeId, LayoutBox>,
    renderer: &'a dyn Renderer,
}

impl<'a> BoundsResolver<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        arena: &'a NodeArena,
        layouts: &'a HashMap<NodeId, LayoutBox>,
        renderer: &'a dyn Renderer,
    ) -> Self {
        Self {
            config,
            arena,
            layouts,
            renderer,
        }
    }

    /// The render surface
    pub fn viewport(&self) -> Rect {
        let (width, height) = self.config.viewport_size;
        Rect::new(0.0, 0.0, width, height)
    }

    /// Absolute bounds of `node_id`, or `None` when no tier knows the node
    pub fn absolute_bounds(&self, node_id: &NodeId) -> Option<Rect> {
        if node_id.is_viewport() {
            return Some(self.viewport());
        }

        if let Some(layout) = self.layouts.get(node_id) {
            let parent = self.parent_bounds(node_id);
            trace!(node = %node_id, "bounds from layout cache");
            return Some(layout.to_absolute(&parent, self.config.default_node_size));
        }

        match self.renderer.measure_element(node_id) {
            Some(Measurement::Absolute(rect)) => {
                trace!(node = %node_id, "bounds from absolute measurement");
                return Some(rect);
            }
            Some(Measurement::ParentRelative(rect)) => {
                trace!(node = %node_id, "bounds from parent-relative measurement");
                return Some(rect.offset_by(&self.parent_bounds(node_id)));
            }
            None => {}
        }

        let (width, height) = self.declared_size(node_id)?;
        trace!(node = %node_id, "bounds from declared size");
        Some(Rect::new(0.0, 0.0, width, height))
    }

    /// Absolute bounds of the node's container; the viewport when unknown
    pub fn parent_bounds(&self, node_id: &NodeId) -> Rect {
        let parent = match self.arena.get(node_id) {
            Some(node) => node.parent.clone(),
            None => node_id.parent().filter(|p| self.arena.contains(p)),
        };
        parent
            .and_then(|parent| self.absolute_bounds(&parent))
            .unwrap_or_else(|| self.viewport())
    }

    /// Width and height from fixed `equalTo` size constraints, position ignored
    fn declared_size(&self, node_id: &NodeId) -> Option<(f64, f64)> {
        let node = self.arena.get(node_id)?;
        let (mut width, mut height) = self.config.default_node_size;
        for constraint in node.constraints.iter().filter(|c| {
            c.constraint_type == ConstraintType::Size
                && c.relation == Relation::EqualTo
                && c.reference.is_none()
        }) {
            match constraint.attribute {
                Attribute::Width => width = constraint.value,
                Attribute::Height => height = constraint.value,
                _ => {}
            }
        }
        Some((width, height))
    }
}
