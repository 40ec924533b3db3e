//! Renderer collaborator interface

use std::collections::HashMap;

use crate::document::NodeId;

use super::types::{LayoutBox, Rect};

/// A box measured by the renderer for an on-screen element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Surface-relative coordinates
    Absolute(Rect),
    /// Coordinates relative to the element's immediate parent
    ParentRelative(Rect),
}

/// The surface that paints solved boxes and can measure what it painted
pub trait Renderer {
    /// Measure the element currently shown for `node_id`, if any
    fn measure_element(&self, node_id: &NodeId) -> Option<Measurement>;

    /// Paint `layout` for `node_id`
    fn apply_box(&mut self, node_id: &NodeId, layout: &LayoutBox);
}

/// Renderer that records every applied box and answers measurements from a
/// preset table.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    measurements: HashMap<NodeId, Measurement>,
    applied: Vec<(NodeId, LayoutBox)>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_measurement(mut self, node_id: NodeId, measurement: Measurement) -> Self {
        self.measurements.insert(node_id, measurement);
        self
    }

    /// Boxes applied so far, in paint order
    pub fn applied(&self) -> &[(NodeId, LayoutBox)] {
        &self.applied
    }

    pub fn clear(&mut self) {
        self.applied.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn measure_element(&self, node_id: &NodeId) -> Option<Measurement> {
        self.measurements.get(node_id).copied()
    }

    fn apply_box(&mut self, node_id: &NodeId, layout: &LayoutBox) {
        self.applied.push((node_id.clone(), layout.clone()));
    }
}
