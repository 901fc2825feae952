//! Retained scene graph for the orrery: nodes with local transforms, owned in
//! an arena and addressed by [`NodeId`].
//!
//! The graph is the single source of truth for simulation state. The builder
//! populates it once at startup and the animation driver mutates node
//! rotations each tick; the renderer walks it read-only every frame.

pub mod graph;
pub mod node;

pub use graph::SceneGraph;
pub use node::{Node, NodeId, NodeKind, TextureRef};
