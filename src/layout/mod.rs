//! Layout engine for computing node positions and sizes
//!
//! A solve pass expands virtual nodes, builds the dependency graph, orders it
//! topologically and evaluates each node's default constraints in that order,
//! producing one [`LayoutBox`] per node.

pub mod arena;
pub mod bounds;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod renderer;
pub mod scheduler;
pub mod session;
pub mod types;

pub use arena::{ArenaNode, NodeArena};
pub use bounds::BoundsResolver;
pub use config::{ConfigError, LayoutConfig};
pub use error::LayoutError;
pub use evaluator::{evaluate, Evaluation};
pub use graph::DependencyGraph;
pub use renderer::{Measurement, RecordingRenderer, Renderer};
pub use session::{LayoutSession, SolveOutcome};
pub use types::*;
