//! Component Layout - a constraint-based UI layout solver with component references
//!
//! This library loads a design document, expands component references
//! ("virtual nodes") and solves every node's declarative constraints into a
//! concrete box.
//!
//! # Example
//!
//! ```rust
//! use component_layout::{solve_source, LayoutConfig};
//!
//! let outcome = solve_source(r#"
//!     [[nodes]]
//!     id = "01"
//!     type = "Screen"
//!
//!     [[nodes.children]]
//!     id = "0101"
//!     type = "Button"
//! "#, None, &LayoutConfig::default()).unwrap();
//!
//! assert_eq!(outcome.order.len(), 2);
//! ```

pub mod component;
pub mod document;
pub mod error;
pub mod layout;

pub use component::{ComponentError, ComponentResolver};
pub use document::{Document, Node, NodeId};
pub use error::DocumentError;
pub use layout::{LayoutConfig, LayoutError, LayoutSession, RecordingRenderer, SolveOutcome};

use thiserror::Error;

/// Errors that can occur during the solve pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Error while loading the document
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Fatal error during the solve pass
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("document has no components")]
    EmptyDocument,
}

/// Load a TOML document and solve one of its components
///
/// `root` defaults to the first component in the document.
///
/// # Example
///
/// ```rust
/// use component_layout::{solve_source, LayoutConfig, NodeId};
///
/// let source = r#"
///     [[nodes]]
///     id = "01"
///     type = "Screen"
///
///     [[nodes]]
///     id = "02"
///     type = "Card"
/// "#;
/// let config = LayoutConfig::default().with_viewport_size(320.0, 640.0);
/// let card = NodeId::parse("02").unwrap();
/// let outcome = solve_source(source, Some(&card), &config).unwrap();
///
/// assert_eq!(outcome.order, vec![card]);
/// ```
pub fn solve_source(
    source: &str,
    root: Option<&NodeId>,
    config: &LayoutConfig,
) -> Result<SolveOutcome, PipelineError> {
    let document = Document::from_toml_str(source)?;
    solve_document(&document, root, config)
}

/// Solve one component of an already loaded document
pub fn solve_document(
    document: &Document,
    root: Option<&NodeId>,
    config: &LayoutConfig,
) -> Result<SolveOutcome, PipelineError> {
    let root = match root {
        Some(id) => id.clone(),
        None => document
            .roots
            .first()
            .map(|node| node.id.clone())
            .ok_or(PipelineError::EmptyDocument)?,
    };
    let mut session = LayoutSession::new(config.clone());
    let mut renderer = RecordingRenderer::new();
    Ok(session.solve(document, &root, &mut renderer)?)
}

/// Render the solved tree indented by depth, one node per line
pub fn format_tree(outcome: &SolveOutcome) -> String {
    fn write_node(out: &mut String, node: &Node, outcome: &SolveOutcome, depth: usize) {
        let indent = "  ".repeat(depth);
        let marker = if node.is_virtual_child { " (virtual)" } else { "" };
        match outcome.rect(&node.id) {
            Some(r) => out.push_str(&format!(
                "{}[{}] {}{} x={:.1} y={:.1} w={:.1} h={:.1}\n",
                indent, node.id, node.node_type, marker, r.x, r.y, r.width, r.height
            )),
            None => out.push_str(&format!("{}[{}] {}{}\n", indent, node.id, node.node_type, marker)),
        }
        for child in &node.children {
            write_node(out, child, outcome, depth + 1);
        }
    }

    let mut out = String::new();
    write_node(&mut out, &outcome.tree, outcome, 0);
    out
}
