//! Scene graph and component lifecycle
//!
//! A [`SceneGraph`] owns a tree of [`Node`]s. Every node carries a
//! [`Transform`] (local pose plus cached world matrix) and an ordered list of
//! [`Component`]s that receive lifecycle hooks while the scene updates.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler --advance(dt)--> SceneGraph --update--> roots, depth-first
//!                                 |                    |
//!                                 |                    +--> Component hooks (NodeContext)
//!                                 +--sync_visuals--> Renderer
//!                                 +--SceneSerializer--> SceneData (JSON / RON)
//! ```
//!
//! Structural changes made from inside hooks are safe: traversal iterates
//! over snapshots and destruction of a node whose hook is running is
//! deferred until that hook returns.

mod component;
mod context;
mod error;
mod hierarchy;
mod lifecycle;
mod node;
mod scene_graph;
mod scene_manager;
mod spatial;
mod transform;

pub mod components;
pub mod serializer;

#[cfg(test)]
mod tests;

pub use component::{Component, ComponentState};
pub use context::NodeContext;
pub use error::SceneError;
pub use node::Node;
pub use scene_graph::SceneGraph;
pub use scene_manager::SceneManager;
pub use serializer::{ComponentData, NodeData, SceneData, SceneSerializer, TransformData, Vec3Data};
pub use transform::Transform;
