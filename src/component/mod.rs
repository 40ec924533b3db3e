//! Component references (virtual nodes)
//!
//! A virtual node embeds a copy of another component's subtree. The copy is
//! re-rooted at the virtual node's id, its descendants get fresh ids in that
//! namespace, and constraint references inside it are remapped so the copy
//! lays out independently of the original.
//!
//! # Example
//!
//! ```rust
//! use component_layout::component::ComponentResolver;
//! use component_layout::document::{Document, Node, NodeId};
//!
//! let card = Node::new(NodeId::parse("02").unwrap(), "Card")
//!     .with_child(Node::new(NodeId::parse("0201").unwrap(), "Title"));
//! let reference = Node::component_reference(
//!     NodeId::parse("0101").unwrap(),
//!     NodeId::parse("02").unwrap(),
//!     "Card",
//! );
//! let screen = Node::new(NodeId::parse("01").unwrap(), "Screen").with_child(reference.clone());
//! let document = Document { roots: vec![screen, card] };
//!
//! let mut resolver = ComponentResolver::new();
//! let expanded = resolver.expand(&reference, &document).unwrap();
//! assert_eq!(expanded.children[0].id.as_str(), "010101");
//! ```

mod registry;
mod resolver;

pub use registry::{CachedExpansion, ComponentError, ExpansionCache};
pub use resolver::ComponentResolver;
