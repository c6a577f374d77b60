//! Scene graph
//!
//! Nodes, their reconciliation system, the fixed draw layers, and the
//! [`Scene`] that ties a world to its systems and cameras.

pub mod layer;
pub mod node;
pub mod node_system;
#[allow(clippy::module_inception)]
pub mod scene;

pub use layer::Layer;
pub use node::{depth_of, root_of, Node, NodeTags, DEFAULT_NODE_NAME};
pub use node_system::NodeSystem;
pub use scene::Scene;
