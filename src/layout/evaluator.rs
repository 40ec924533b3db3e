//! Constraint evaluation
//!
//! Turns one node's default-package constraints into a [`LayoutBox`]. Constraint
//! kinds are applied in a fixed order (size, edge, center, baseline, aspect
//! ratio) and a value, once set, is never overwritten by a later constraint.
//! A final pass fills the gaps the constraints left open.

use tracing::{debug, warn};

use crate::document::{Attribute, Constraint, ConstraintType, Relation};

use super::arena::ArenaNode;
use super::bounds::BoundsResolver;
use super::config::LayoutConfig;
use super::error::LayoutError;
use super::types::{clamp_extent, BaselineAlignment, Length, LayoutBox, Rect};

/// Result of evaluating a single node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    pub layout: LayoutBox,
    pub diagnostics: Vec<LayoutError>,
}

const ORDER: [ConstraintType; 5] = [
    ConstraintType::Size,
    ConstraintType::Edge,
    ConstraintType::Center,
    ConstraintType::Baseline,
    ConstraintType::AspectRatio,
];

/// Compute the layout box for `node`.
///
/// References are read through `bounds`, so everything `node` depends on must
/// already be evaluated for the pass.
pub fn evaluate(node: &ArenaNode, bounds: &BoundsResolver<'_>, config: &LayoutConfig) -> Evaluation {
    if node.id.is_viewport() {
        let surface = bounds.viewport();
        return Evaluation {
            layout: LayoutBox {
                left: Some(Length::Px(0.0)),
                top: Some(Length::Px(0.0)),
                width: Some(Length::Px(surface.width)),
                height: Some(Length::Px(surface.height)),
                ..Default::default()
            },
            diagnostics: Vec::new(),
        };
    }

    let mut eval = Evaluator {
        node,
        bounds,
        parent: bounds.parent_bounds(&node.id),
        layout: LayoutBox::default(),
        diagnostics: Vec::new(),
    };

    for kind in ORDER {
        for constraint in node.constraints.iter().filter(|c| c.constraint_type == kind) {
            eval.apply(constraint);
        }
    }
    eval.fill_gaps(config);

    Evaluation {
        layout: eval.layout,
        diagnostics: eval.diagnostics,
    }
}

struct Evaluator<'n, 'b, 'a> {
    node: &'n ArenaNode,
    bounds: &'b BoundsResolver<'a>,
    /// Absolute bounds of the node's container
    parent: Rect,
    layout: LayoutBox,
    diagnostics: Vec<LayoutError>,
}

impl Evaluator<'_, '_, '_> {
    fn apply(&mut self, constraint: &Constraint) {
        match constraint.constraint_type {
            ConstraintType::Size => self.apply_size(constraint),
            ConstraintType::Edge => self.apply_edge(constraint),
            ConstraintType::Center => self.apply_center(constraint),
            ConstraintType::Baseline => {
                if self.layout.baseline.is_none() {
                    self.layout.baseline = BaselineAlignment::from_attribute(constraint.attribute);
                }
            }
            ConstraintType::AspectRatio => {
                if self.layout.aspect_ratio.is_none() {
                    self.layout.aspect_ratio = self.target(constraint);
                }
            }
        }
    }

    // ========================================================================
    // Constraint kinds
    // ========================================================================

    fn apply_size(&mut self, constraint: &Constraint) {
        let Some(value) = self.target(constraint) else {
            return;
        };
        let horizontal = match constraint.attribute {
            Attribute::Width => true,
            Attribute::Height => false,
            _ => return,
        };
        let layout = &mut self.layout;
        match (constraint.relation, horizontal) {
            (Relation::EqualTo, true) => set_once(&mut layout.width, Length::Px(value)),
            (Relation::EqualTo, false) => set_once(&mut layout.height, Length::Px(value)),
            (Relation::GreaterThanOrEqualTo, true) => set_once(&mut layout.min_width, value),
            (Relation::GreaterThanOrEqualTo, false) => set_once(&mut layout.min_height, value),
            (Relation::LessThanOrEqualTo, true) => set_once(&mut layout.max_width, value),
            (Relation::LessThanOrEqualTo, false) => set_once(&mut layout.max_height, value),
        }
    }

    fn apply_edge(&mut self, constraint: &Constraint) {
        if constraint.relation != Relation::EqualTo {
            self.report(LayoutError::UnsupportedRelation {
                node_id: self.node.id.clone(),
                constraint_id: constraint.id.clone(),
                attribute: constraint.attribute,
                relation: constraint.relation,
            });
            return;
        }

        let offset = match constraint.reference {
            None => constraint.value,
            Some(_) => {
                let Some(absolute) = self.target(constraint) else {
                    return;
                };
                let parent = self.parent;
                let relative = match constraint.attribute {
                    Attribute::Left | Attribute::Leading => absolute - parent.x,
                    Attribute::Top => absolute - parent.y,
                    Attribute::Right | Attribute::Trailing => parent.right() - absolute,
                    Attribute::Bottom => parent.bottom() - absolute,
                    _ => return,
                };
                relative.max(0.0)
            }
        };

        let slot = match constraint.attribute {
            Attribute::Left | Attribute::Leading => &mut self.layout.left,
            Attribute::Top => &mut self.layout.top,
            Attribute::Right | Attribute::Trailing => &mut self.layout.right,
            Attribute::Bottom => &mut self.layout.bottom,
            _ => return,
        };
        set_once(slot, Length::Px(offset));
    }

    /// Centered axes get a 50% offset plus the half-size transform. An axis
    /// whose leading offset an edge constraint already set keeps that edge.
    fn apply_center(&mut self, constraint: &Constraint) {
        let (x, y) = match constraint.attribute {
            Attribute::CenterX => (true, false),
            Attribute::CenterY => (false, true),
            Attribute::Center => (true, true),
            _ => return,
        };
        if x && self.layout.left.is_none() {
            self.layout.left = Some(Length::Percent(50.0));
            self.layout.center.x = true;
        }
        if y && self.layout.top.is_none() {
            self.layout.top = Some(Length::Percent(50.0));
            self.layout.center.y = true;
        }
    }

    /// The constraint's value, offset from its reference when it has one.
    ///
    /// Offset and inset references both resolve to `reference + value`.
    fn target(&mut self, constraint: &Constraint) -> Option<f64> {
        let Some(reference) = &constraint.reference else {
            return Some(constraint.value);
        };
        match self.bounds.absolute_bounds(&reference.node_id) {
            Some(rect) => Some(rect.attribute(reference.attribute) + constraint.value),
            None => {
                self.report(LayoutError::ReferenceNotFound {
                    node_id: self.node.id.clone(),
                    constraint_id: constraint.id.clone(),
                    reference: reference.node_id.clone(),
                });
                None
            }
        }
    }

    fn report(&mut self, error: LayoutError) {
        warn!("{}", error);
        self.diagnostics.push(error);
    }

    // ========================================================================
    // Gap filling
    // ========================================================================

    fn fill_gaps(&mut self, config: &LayoutConfig) {
        let (default_width, default_height) = config.default_node_size;
        let parent = self.parent;
        let layout = &mut self.layout;

        if layout.width.is_none() {
            if let (Some(left), Some(right)) = (layout.left, layout.right) {
                let width = parent.width - left.resolve(parent.width) - right.resolve(parent.width);
                layout.width = Some(Length::Px(width.max(0.0)));
            }
        }

        if layout.height.is_none() {
            if let (Some(top), Some(bottom)) = (layout.top, layout.bottom) {
                let height = parent.height - top.resolve(parent.height) - bottom.resolve(parent.height);
                layout.height = Some(Length::Px(height.max(0.0)));
            } else if !has_height_constraint(&self.node.constraints) {
                layout.height = Some(Length::Px(default_height));
            }
        }

        if layout.width.is_none() {
            let from_ratio = match (layout.aspect_ratio, layout.height) {
                (Some(ratio), Some(Length::Px(height))) if ratio > 0.0 => Some(height * ratio),
                _ => None,
            };
            let width = from_ratio.unwrap_or(default_width);
            layout.width = Some(Length::Px(clamp_extent(width, layout.min_width, layout.max_width)));
        }

        if !layout.has_position() {
            layout.left = Some(Length::Px(0.0));
            layout.top = Some(Length::Px(0.0));
        }

        debug!(node = %self.node.id, layout = ?self.layout, "evaluated node");
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Whether any constraint could determine the height on its own
fn has_height_constraint(constraints: &[Constraint]) -> bool {
    constraints.iter().any(|c| {
        matches!(
            (c.constraint_type, c.attribute),
            (ConstraintType::Size, Attribute::Height) | (ConstraintType::AspectRatio, _)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ConstraintPackage, Node, NodeId};
    use crate::layout::arena::NodeArena;
    use crate::layout::renderer::RecordingRenderer;
    use std::collections::HashMap;

    fn id(s: &str) -> NodeId {
        NodeId::parse(s).unwrap()
    }

    fn constrained(node_id: &str, constraints: Vec<Constraint>) -> Node {
        let mut package = ConstraintPackage::new("main", "Main");
        package.is_default = true;
        package.constraints = constraints;
        Node::new(id(node_id), "View").with_package(package)
    }

    fn c(kind: ConstraintType, attribute: Attribute, value: f64) -> Constraint {
        Constraint::new("c", kind, attribute, Relation::EqualTo, value)
    }

    /// Evaluate nodes in the given order, feeding each result into the next
    fn solve(tree: &Node, order: &[&str], config: &LayoutConfig) -> HashMap<NodeId, Evaluation> {
        let arena = NodeArena::from_tree(tree);
        let renderer = RecordingRenderer::new();
        let mut layouts = HashMap::new();
        let mut results = HashMap::new();
        for node in order {
            let eval = {
                let bounds = BoundsResolver::new(config, &arena, &layouts, &renderer);
                evaluate(arena.get(&id(node)).unwrap(), &bounds, config)
            };
            layouts.insert(id(node), eval.layout.clone());
            results.insert(id(node), eval);
        }
        results
    }

    #[test]
    fn test_left_right_derive_width() {
        let tree = constrained("01", vec![c(ConstraintType::Size, Attribute::Width, 300.0)])
            .with_child(constrained(
                "0101",
                vec![
                    c(ConstraintType::Edge, Attribute::Left, 10.0),
                    c(ConstraintType::Edge, Attribute::Right, 10.0),
                ],
            ));
        let results = solve(&tree, &["01", "0101"], &LayoutConfig::new());
        assert_eq!(results[&id("0101")].layout.width, Some(Length::Px(280.0)));
    }

    #[test]
    fn test_size_reference_adds_delta() {
        let tree = constrained("01", vec![])
            .with_child(constrained("0101", vec![c(ConstraintType::Size, Attribute::Width, 100.0)]))
            .with_child(constrained(
                "0102",
                vec![c(ConstraintType::Size, Attribute::Width, 20.0)
                    .with_reference(id("0101"), Attribute::Width)],
            ));
        let results = solve(&tree, &["01", "0101", "0102"], &LayoutConfig::new());
        assert_eq!(results[&id("0102")].layout.width, Some(Length::Px(120.0)));
    }

    #[test]
    fn test_min_max_size() {
        let mut min = c(ConstraintType::Size, Attribute::Width, 120.0);
        min.relation = Relation::GreaterThanOrEqualTo;
        let mut max = c(ConstraintType::Size, Attribute::Height, 40.0);
        max.relation = Relation::LessThanOrEqualTo;
        let tree = constrained("01", vec![min, max]);
        let layout = &solve(&tree, &["01"], &LayoutConfig::new())[&id("01")].layout;

        assert_eq!(layout.min_width, Some(120.0));
        assert_eq!(layout.max_height, Some(40.0));
        assert_eq!(layout.width, Some(Length::Px(120.0)));
        assert_eq!(layout.height, None);
    }

    #[test]
    fn test_edge_reference_is_parent_relative() {
        let tree = constrained(
            "01",
            vec![
                c(ConstraintType::Edge, Attribute::Left, 20.0),
                c(ConstraintType::Edge, Attribute::Top, 40.0),
                c(ConstraintType::Size, Attribute::Width, 300.0),
                c(ConstraintType::Size, Attribute::Height, 400.0),
            ],
        )
        .with_child(constrained(
            "0101",
            vec![
                c(ConstraintType::Size, Attribute::Height, 50.0),
                c(ConstraintType::Edge, Attribute::Top, 10.0),
            ],
        ))
        .with_child(constrained(
            "0102",
            vec![
                c(ConstraintType::Edge, Attribute::Top, 8.0)
                    .with_reference(id("0101"), Attribute::Bottom),
                c(ConstraintType::Edge, Attribute::Right, 0.0)
                    .with_reference(id("0101"), Attribute::Right),
            ],
        ));
        let results = solve(&tree, &["01", "0101", "0102"], &LayoutConfig::new());
        let layout = &results[&id("0102")].layout;

        // 0101 spans y 50..100 absolute; parent origin is y 40
        assert_eq!(layout.top, Some(Length::Px(68.0)));
        // 0101 right edge = 20 + 80; parent right = 320
        assert_eq!(layout.right, Some(Length::Px(220.0)));
    }

    #[test]
    fn test_reference_offsets_clamped_non_negative() {
        let tree = constrained("01", vec![c(ConstraintType::Edge, Attribute::Left, 50.0)])
            .with_child(constrained(
                "0101",
                vec![c(ConstraintType::Edge, Attribute::Left, -30.0)
                    .with_reference(NodeId::viewport(), Attribute::Left)],
            ));
        let results = solve(&tree, &["01", "0101"], &LayoutConfig::new());
        assert_eq!(results[&id("0101")].layout.left, Some(Length::Px(0.0)));
    }

    #[test]
    fn test_unsupported_edge_relation() {
        let mut edge = c(ConstraintType::Edge, Attribute::Left, 10.0);
        edge.relation = Relation::GreaterThanOrEqualTo;
        let tree = constrained("01", vec![edge]);
        let eval = &solve(&tree, &["01"], &LayoutConfig::new())[&id("01")];

        assert!(matches!(
            eval.diagnostics.as_slice(),
            [LayoutError::UnsupportedRelation { .. }]
        ));
        assert_eq!(eval.layout.left, Some(Length::Px(0.0)));
    }

    #[test]
    fn test_missing_reference_is_skipped() {
        let tree = constrained(
            "01",
            vec![
                c(ConstraintType::Size, Attribute::Width, 0.0).with_reference(id("0199"), Attribute::Width),
                c(ConstraintType::Size, Attribute::Height, 25.0),
            ],
        );
        let eval = &solve(&tree, &["01"], &LayoutConfig::new())[&id("01")];

        assert_eq!(
            eval.diagnostics,
            vec![LayoutError::ReferenceNotFound {
                node_id: id("01"),
                constraint_id: "c".to_string(),
                reference: id("0199"),
            }]
        );
        assert_eq!(eval.layout.height, Some(Length::Px(25.0)));
        assert_eq!(eval.layout.width, Some(Length::Px(80.0)));
    }

    #[test]
    fn test_center_sets_percent_and_transform() {
        let tree = constrained(
            "01",
            vec![
                c(ConstraintType::Size, Attribute::Width, 40.0),
                c(ConstraintType::Center, Attribute::Center, 0.0),
            ],
        );
        let layout = &solve(&tree, &["01"], &LayoutConfig::new())[&id("01")].layout;

        assert_eq!(layout.left, Some(Length::Percent(50.0)));
        assert_eq!(layout.top, Some(Length::Percent(50.0)));
        assert!(layout.center.x && layout.center.y);
    }

    #[test]
    fn test_earlier_values_win() {
        let tree = constrained(
            "01",
            vec![
                c(ConstraintType::Size, Attribute::Width, 10.0),
                c(ConstraintType::Size, Attribute::Width, 99.0),
                c(ConstraintType::Edge, Attribute::Left, 5.0),
                c(ConstraintType::Center, Attribute::CenterX, 0.0),
            ],
        );
        let layout = &solve(&tree, &["01"], &LayoutConfig::new())[&id("01")].layout;

        assert_eq!(layout.width, Some(Length::Px(10.0)));
        assert_eq!(layout.left, Some(Length::Px(5.0)));
        assert!(!layout.center.x);
    }

    #[test]
    fn test_annotations() {
        let tree = constrained(
            "01",
            vec![
                c(ConstraintType::Baseline, Attribute::FirstBaseline, 0.0),
                c(ConstraintType::AspectRatio, Attribute::AspectRatio, 2.0),
                c(ConstraintType::Size, Attribute::Height, 30.0),
            ],
        );
        let layout = &solve(&tree, &["01"], &LayoutConfig::new())[&id("01")].layout;

        assert_eq!(layout.baseline, Some(BaselineAlignment::First));
        assert_eq!(layout.aspect_ratio, Some(2.0));
        assert_eq!(layout.width, Some(Length::Px(60.0)));
        assert_eq!(layout.left, Some(Length::Px(0.0)));
    }

    #[test]
    fn test_defaults_fill_unconstrained_node() {
        let config = LayoutConfig::new().with_default_node_size(64.0, 24.0);
        let tree = Node::new(id("01"), "View");
        let layout = &solve(&tree, &["01"], &config)[&id("01")].layout;

        assert_eq!(layout.width, Some(Length::Px(64.0)));
        assert_eq!(layout.height, Some(Length::Px(24.0)));
        assert_eq!(layout.left, Some(Length::Px(0.0)));
        assert_eq!(layout.top, Some(Length::Px(0.0)));
    }

    #[test]
    fn test_viewport_box_covers_surface() {
        let config = LayoutConfig::new().with_viewport_size(100.0, 200.0);
        let tree = Node::new(id("01"), "View");
        let layout = &solve(&tree, &["00"], &config)[&NodeId::viewport()].layout;
        assert_eq!(layout.width, Some(Length::Px(100.0)));
        assert_eq!(layout.height, Some(Length::Px(200.0)));
    }
}
