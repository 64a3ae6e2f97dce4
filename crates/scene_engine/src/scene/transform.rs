//! Node transform: local pose plus a lazily cached world matrix
//!
//! The local pose is stored as position, Euler rotation (radians) and scale.
//! The world matrix is cached behind a dirty flag: writes mark the owning
//! node and its whole subtree dirty (done by the scene graph, which knows the
//! hierarchy), reads recompute on demand. Interior mutability lets the cache
//! be refreshed through a shared borrow of the graph.
//!
//! Invariant: a clean transform implies every ancestor transform is clean,
//! so a dirty transform implies its whole subtree is dirty.

use std::cell::Cell;

use crate::foundation::math::{compose_trs, rotation_from_euler, Mat4, Vec3};
use crate::impl_component_any;
use crate::scene::Component;

/// Position, rotation and scale of a node relative to its parent
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    world: Cell<Mat4>,
    dirty: Cell<bool>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.rotation == other.rotation && self.scale == other.scale
    }
}

impl Transform {
    /// Create a transform from a local pose
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            world: Cell::new(Mat4::identity()),
            dirty: Cell::new(true),
        }
    }

    /// Create a transform at `position` with identity rotation and unit scale
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Local position
    pub fn local_position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation as Euler angles in radians
    pub fn local_rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Local scale
    pub fn local_scale(&self) -> Vec3 {
        self.scale
    }

    /// Local `T * R * S` matrix
    pub fn local_matrix(&self) -> Mat4 {
        compose_trs(&self.position, &self.rotation, &self.scale)
    }

    /// Local rotation as a matrix
    pub fn local_rotation_matrix(&self) -> Mat4 {
        rotation_from_euler(&self.rotation)
    }

    /// Whether the cached world matrix is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub(crate) fn set_local(&mut self, position: Vec3, rotation: Vec3, scale: Vec3) {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub(crate) fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    pub(crate) fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Mark stale. Returns `false` if it already was.
    pub(crate) fn mark_dirty(&self) -> bool {
        !self.dirty.replace(true)
    }

    /// Cached world matrix, if it is still valid
    pub(crate) fn cached_world(&self) -> Option<Mat4> {
        if self.dirty.get() {
            None
        } else {
            Some(self.world.get())
        }
    }

    /// Recompute and cache the world matrix from the parent's world matrix
    pub(crate) fn refresh_world(&self, parent_world: Option<&Mat4>) -> Mat4 {
        let local = self.local_matrix();
        let world = match parent_world {
            Some(parent) => parent * local,
            None => local,
        };
        self.world.set(world);
        self.dirty.set(false);
        world
    }
}

/// The transform is the implicit first component of every node. It is
/// created with the node and can be neither added again nor removed.
impl Component for Transform {
    fn type_name(&self) -> &'static str {
        "transform"
    }

    fn is_unique(&self) -> bool {
        true
    }

    impl_component_any!();
}
