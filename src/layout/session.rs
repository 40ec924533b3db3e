//! Solve passes
//!
//! A [`LayoutSession`] owns everything that outlives a single pass (the
//! configuration and the component expansion cache) and the per-pass state
//! (node arena, dependency graph, layout cache), which is discarded at the
//! start of every pass.

use std::collections::HashMap;

use tracing::{debug, error, warn};

use crate::component::{ComponentError, ComponentResolver};
use crate::document::{Document, Node, NodeId};

use super::arena::NodeArena;
use super::bounds::BoundsResolver;
use super::config::LayoutConfig;
use super::error::LayoutError;
use super::evaluator::evaluate;
use super::graph::{self, DependencyGraph};
use super::renderer::Renderer;
use super::scheduler;
use super::types::{LayoutBox, Rect};

/// Result of one completed solve pass
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    /// The concrete tree that was solved, virtual nodes expanded
    pub tree: Node,
    /// Evaluation order; the viewport is left out
    pub order: Vec<NodeId>,
    /// Layout boxes in evaluation order
    pub boxes: Vec<(NodeId, LayoutBox)>,
    /// Absolute rectangles for every solved node
    pub rects: HashMap<NodeId, Rect>,
    /// Non-fatal problems, in the order they were found
    pub diagnostics: Vec<LayoutError>,
}

impl SolveOutcome {
    pub fn layout(&self, id: &NodeId) -> Option<&LayoutBox> {
        self.boxes.iter().find(|(n, _)| n == id).map(|(_, b)| b)
    }

    pub fn rect(&self, id: &NodeId) -> Option<Rect> {
        self.rects.get(id).copied()
    }
}

#[derive(Debug, Default)]
struct PassState {
    arena: NodeArena,
    graph: DependencyGraph,
    layouts: HashMap<NodeId, LayoutBox>,
}

#[derive(Debug, Default)]
pub struct LayoutSession {
    config: LayoutConfig,
    components: ComponentResolver,
    pass: PassState,
    last: Option<SolveOutcome>,
}

impl LayoutSession {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn components(&self) -> &ComponentResolver {
        &self.components
    }

    /// Change the render surface size; takes effect on the next pass
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.viewport_size = (width, height);
    }

    /// The most recent pass that ran to completion
    pub fn last_outcome(&self) -> Option<&SolveOutcome> {
        self.last.as_ref()
    }

    /// Run one full pass over the component at `root_id`.
    ///
    /// Virtual nodes are expanded, nodes are ordered by their dependencies and
    /// evaluated in that order, and every box is handed to `renderer`. A cycle
    /// or an unknown root aborts the pass, leaving the previous outcome in
    /// place; all other problems end up in [`SolveOutcome::diagnostics`].
    pub fn solve(
        &mut self,
        document: &Document,
        root_id: &NodeId,
        renderer: &mut dyn Renderer,
    ) -> Result<SolveOutcome, LayoutError> {
        self.pass = PassState::default();
        debug!(root = %root_id, "solve pass started");

        let root = document.find(root_id).ok_or_else(|| LayoutError::UnknownRoot {
            id: root_id.clone(),
        })?;

        let mut component_errors: Vec<ComponentError> = Vec::new();
        let tree = self.components.expand_tree(root, document, &mut component_errors);
        let mut diagnostics: Vec<LayoutError> =
            component_errors.into_iter().map(LayoutError::from).collect();

        self.pass.arena = NodeArena::from_tree(&tree);
        self.pass.graph = graph::build(&tree.id, &self.pass.arena);
        let order = match scheduler::sort(&self.pass.graph, self.pass.arena.ids()) {
            Ok(order) => order,
            Err(err) => {
                error!("solve pass aborted: {}", err);
                return Err(err);
            }
        };
        debug!(order = ?order.iter().map(NodeId::as_str).collect::<Vec<_>>(), "evaluation order");

        for id in &order {
            let Some(node) = self.pass.arena.get(id) else {
                continue;
            };
            let evaluation = {
                let bounds =
                    BoundsResolver::new(&self.config, &self.pass.arena, &self.pass.layouts, &*renderer);
                evaluate(node, &bounds, &self.config)
            };
            diagnostics.extend(evaluation.diagnostics);
            self.pass.layouts.insert(id.clone(), evaluation.layout);
        }

        let order: Vec<NodeId> = order.into_iter().filter(|id| !id.is_viewport()).collect();
        let mut boxes = Vec::with_capacity(order.len());
        let mut rects = HashMap::with_capacity(order.len());
        for id in &order {
            let Some(layout) = self.pass.layouts.get(id) else {
                continue;
            };
            let bounds =
                BoundsResolver::new(&self.config, &self.pass.arena, &self.pass.layouts, &*renderer);
            if let Some(rect) = bounds.absolute_bounds(id) {
                rects.insert(id.clone(), rect);
            }
            boxes.push((id.clone(), layout.clone()));
        }
        for (id, layout) in &boxes {
            renderer.apply_box(id, layout);
        }

        if !diagnostics.is_empty() {
            warn!(count = diagnostics.len(), "solve pass finished with diagnostics");
        }
        debug!(nodes = order.len(), "solve pass finished");

        let outcome = SolveOutcome {
            tree,
            order,
            boxes,
            rects,
            diagnostics,
        };
        self.last = Some(outcome.clone());
        Ok(outcome)
    }

    /// The referenced component changed; drop its expansions.
    ///
    /// Returns the virtual nodes that need re-rendering.
    pub fn on_referenced_root_changed(&mut self, root_id: &NodeId) -> Vec<NodeId> {
        self.components.on_referenced_root_changed(root_id)
    }

    pub fn on_virtual_node_removed(&mut self, virtual_id: &NodeId) -> bool {
        self.components.on_virtual_node_removed(virtual_id)
    }

    /// Check a virtual node before an edit commits it
    pub fn validate_virtual(&self, node: &Node, document: &Document) -> Result<(), ComponentError> {
        self.components.validate(node, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Attribute, Constraint, ConstraintPackage, ConstraintType, Relation};
    use crate::layout::renderer::RecordingRenderer;
    use crate::layout::types::Length;

    fn id(s: &str) -> NodeId {
        NodeId::parse(s).unwrap()
    }

    fn with_constraints(node: Node, constraints: Vec<Constraint>) -> Node {
        let mut package = ConstraintPackage::new("main", "Main");
        package.is_default = true;
        package.constraints = constraints;
        node.with_package(package)
    }

    fn top_of(target: &str) -> Constraint {
        Constraint::new("t", ConstraintType::Edge, Attribute::Top, Relation::EqualTo, 0.0)
            .with_reference(id(target), Attribute::Bottom)
    }

    fn cyclic_document() -> Document {
        let screen = Node::new(id("01"), "Screen")
            .with_child(with_constraints(Node::new(id("0101"), "A"), vec![top_of("0102")]))
            .with_child(with_constraints(Node::new(id("0102"), "B"), vec![top_of("0101")]));
        Document { roots: vec![screen] }
    }

    fn stacked_document() -> Document {
        let screen = Node::new(id("01"), "Screen")
            .with_child(with_constraints(Node::new(id("0101"), "A"), vec![top_of("0102")]))
            .with_child(Node::new(id("0102"), "B"));
        Document { roots: vec![screen] }
    }

    #[test]
    fn test_solve_orders_and_applies_boxes() {
        let mut session = LayoutSession::new(LayoutConfig::new());
        let mut renderer = RecordingRenderer::new();
        let outcome = session
            .solve(&stacked_document(), &id("01"), &mut renderer)
            .unwrap();

        assert_eq!(outcome.order, vec![id("01"), id("0102"), id("0101")]);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(renderer.applied().len(), 3);
        assert_eq!(outcome.layout(&id("0101")).unwrap().top, Some(Length::Px(30.0)));
        assert_eq!(outcome.rect(&id("0101")), Some(Rect::new(0.0, 30.0, 80.0, 30.0)));
    }

    #[test]
    fn test_cycle_aborts_and_keeps_previous_outcome() {
        let mut session = LayoutSession::new(LayoutConfig::new());
        let mut renderer = RecordingRenderer::new();
        session
            .solve(&stacked_document(), &id("01"), &mut renderer)
            .unwrap();
        renderer.clear();

        let err = session
            .solve(&cyclic_document(), &id("01"), &mut renderer)
            .unwrap_err();
        assert!(matches!(err, LayoutError::CyclicDependency { .. }));
        assert!(renderer.applied().is_empty());
        assert_eq!(session.last_outcome().unwrap().order.len(), 3);

        // a later pass is unaffected by the aborted one
        assert!(session.solve(&stacked_document(), &id("01"), &mut renderer).is_ok());
    }

    #[test]
    fn test_unknown_root() {
        let mut session = LayoutSession::new(LayoutConfig::new());
        let mut renderer = RecordingRenderer::new();
        assert_eq!(
            session.solve(&stacked_document(), &id("09"), &mut renderer),
            Err(LayoutError::UnknownRoot { id: id("09") })
        );
        assert!(session.last_outcome().is_none());
    }

    #[test]
    fn test_resize_changes_viewport() {
        let mut session = LayoutSession::new(LayoutConfig::new());
        session.resize(1024.0, 768.0);
        let screen = with_constraints(
            Node::new(id("01"), "Screen"),
            vec![Constraint::new(
                "w",
                ConstraintType::Size,
                Attribute::Width,
                Relation::EqualTo,
                -10.0,
            )
            .with_reference(NodeId::viewport(), Attribute::Width)],
        );
        let doc = Document { roots: vec![screen] };
        let outcome = session
            .solve(&doc, &id("01"), &mut RecordingRenderer::new())
            .unwrap();
        assert_eq!(outcome.rect(&id("01")).unwrap().width, 1014.0);
    }

    #[test]
    fn test_component_errors_become_diagnostics() {
        let screen = Node::new(id("01"), "Screen")
            .with_child(Node::component_reference(id("0101"), id("05"), "Missing"));
        let doc = Document { roots: vec![screen] };
        let mut session = LayoutSession::new(LayoutConfig::new());
        let outcome = session
            .solve(&doc, &id("01"), &mut RecordingRenderer::new())
            .unwrap();

        assert!(matches!(
            outcome.diagnostics.as_slice(),
            [LayoutError::Component(ComponentError::ReferenceNotFound { .. })]
        ));
        assert!(outcome.rect(&id("0101")).is_some());
    }
}
