//! Scene graph errors
//!
//! Every variant is recoverable: the operation that produced it was rejected
//! and the graph was left untouched.

use thiserror::Error;

use crate::foundation::collections::NodeId;

/// Errors reported by scene graph operations
#[derive(Error, Debug)]
pub enum SceneError {
    /// The node handle does not resolve (never existed or already destroyed)
    #[error("Node not found")]
    NodeNotFound,

    /// A node was asked to become its own parent
    #[error("Node {0} cannot be its own parent")]
    SelfParent(NodeId),

    /// Reparenting would make a node its own ancestor
    #[error("Cannot parent node {node} under its descendant {new_parent}")]
    CycleDetected {
        /// Node being reparented
        node: NodeId,
        /// Requested parent, which is a descendant of `node`
        new_parent: NodeId,
    },

    /// `load` on a scene that is already loaded
    #[error("Scene '{0}' is already loaded")]
    AlreadyLoaded(String),

    /// `unload` on a scene that is not loaded
    #[error("Scene '{0}' is not loaded")]
    NotLoaded(String),

    /// Attempt to remove a node's transform
    #[error("The transform of node {0} cannot be removed")]
    TransformRemoval(NodeId),

    /// The component handle is not attached to the node
    #[error("Component not found on node {0}")]
    ComponentNotFound(NodeId),

    /// Structural change requested on a node that is being torn down
    #[error("Node {0} is being destroyed")]
    NodeDestroying(NodeId),

    /// No scene registered under the given name
    #[error("Scene '{0}' not found")]
    SceneNotFound(String),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON decoding failed
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON encoding failed
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),
}
