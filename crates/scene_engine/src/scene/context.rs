//! Hook context handed to components
//!
//! A [`NodeContext`] identifies the node and component whose hook is running
//! and lends out the whole scene graph. Everything a component does to the
//! scene goes through it.

use crate::foundation::collections::{ComponentId, NodeId, NodeKey};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::VisualHandle;
use crate::scene::{Component, Node, SceneError, SceneGraph, Transform};

/// Access to the scene from inside a component hook
pub struct NodeContext<'a> {
    scene: &'a mut SceneGraph,
    node: NodeKey,
    component: ComponentId,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(scene: &'a mut SceneGraph, node: NodeKey, component: ComponentId) -> Self {
        Self { scene, node, component }
    }

    /// Handle of the owning node
    pub fn node_key(&self) -> NodeKey {
        self.node
    }

    /// Handle of the component whose hook is running
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// The owning node
    pub fn node(&self) -> Option<&Node> {
        self.scene.node(self.node)
    }

    /// Id of the owning node
    pub fn node_id(&self) -> Option<NodeId> {
        self.node().map(Node::id)
    }

    /// The scene graph
    pub fn scene(&self) -> &SceneGraph {
        self.scene
    }

    /// The scene graph, mutably
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        self.scene
    }

    /// Transform of the owning node
    pub fn transform(&self) -> Option<&Transform> {
        self.scene.transform(self.node)
    }

    /// World position of the owning node
    pub fn world_position(&self) -> Option<Vec3> {
        self.scene.world_position(self.node)
    }

    /// World matrix of the owning node
    pub fn world_matrix(&self) -> Option<Mat4> {
        self.scene.world_matrix(self.node)
    }

    /// Offset the owning node's local position
    pub fn translate(&mut self, delta: Vec3) -> Result<(), SceneError> {
        self.scene.translate(self.node, delta)
    }

    /// Add Euler angles to the owning node's local rotation
    pub fn rotate(&mut self, delta: Vec3) -> Result<(), SceneError> {
        self.scene.rotate(self.node, delta)
    }

    /// Set the owning node's local position
    pub fn set_local_position(&mut self, position: Vec3) -> Result<(), SceneError> {
        self.scene.set_local_position(self.node, position)
    }

    /// Move the owning node to a world position
    pub fn set_world_position(&mut self, position: Vec3) -> Result<bool, SceneError> {
        self.scene.set_world_position(self.node, position)
    }

    /// Destroy the owning node once the running hook returns
    pub fn destroy_node(&mut self) -> Result<(), SceneError> {
        self.scene.destroy(self.node)
    }

    /// Detach the running component once its hook returns
    pub fn remove_self(&mut self) -> Result<(), SceneError> {
        self.scene.remove_component(self.node, self.component)
    }

    /// Sibling component of type `T` on the owning node
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.scene.get_component::<T>(self.node)
    }

    /// Mutable sibling component of type `T` on the owning node
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.scene.get_component_mut::<T>(self.node)
    }

    /// Queue a bound visual for release on the next renderer sync
    pub fn release_visual(&mut self, handle: VisualHandle) {
        self.scene.released_visuals.push(handle);
    }
}
