//! Transform queries and writes routed through the scene graph
//!
//! Writes invalidate eagerly (the node and its whole subtree are marked
//! dirty); reads recompute lazily along the parent chain and cache the result.

use log::{debug, warn};
use nalgebra::Point3;

use crate::foundation::collections::NodeKey;
use crate::foundation::math::{
    basis_column, decompose_trs, normalize_or_zero, rotation_from_euler, translation_of, try_inverse, Mat4, Vec3,
};
use crate::scene::{SceneError, SceneGraph, Transform};

impl SceneGraph {
    /// Transform of `node`
    pub fn transform(&self, node: NodeKey) -> Option<&Transform> {
        self.nodes.get(node).map(|entry| &entry.transform)
    }

    /// Local `T * R * S` matrix of `node`
    pub fn local_matrix(&self, node: NodeKey) -> Option<Mat4> {
        self.transform(node).map(Transform::local_matrix)
    }

    /// World matrix of `node`: `parent.world * local`, or `local` for a root
    pub fn world_matrix(&self, node: NodeKey) -> Option<Mat4> {
        let entry = self.nodes.get(node)?;
        if let Some(world) = entry.transform.cached_world() {
            return Some(world);
        }
        let parent_world = entry.parent.and_then(|parent| self.world_matrix(parent));
        Some(entry.transform.refresh_world(parent_world.as_ref()))
    }

    /// World-space position of `node`
    pub fn world_position(&self, node: NodeKey) -> Option<Vec3> {
        self.world_matrix(node).map(|world| translation_of(&world))
    }

    /// World-space forward direction (`-Z` basis column, normalized)
    pub fn world_forward(&self, node: NodeKey) -> Option<Vec3> {
        self.world_matrix(node)
            .map(|world| normalize_or_zero(-basis_column(&world, 2)))
    }

    /// World-space right direction (`+X` basis column, normalized)
    pub fn world_right(&self, node: NodeKey) -> Option<Vec3> {
        self.world_matrix(node)
            .map(|world| normalize_or_zero(basis_column(&world, 0)))
    }

    /// World-space up direction (`+Y` basis column, normalized)
    pub fn world_up(&self, node: NodeKey) -> Option<Vec3> {
        self.world_matrix(node)
            .map(|world| normalize_or_zero(basis_column(&world, 1)))
    }

    /// Decomposed world pose: position, Euler rotation, scale
    pub fn world_pose(&self, node: NodeKey) -> Option<(Vec3, Vec3, Vec3)> {
        self.world_matrix(node).map(|world| decompose_trs(&world))
    }

    /// World rotation of `node` as a pure rotation matrix (scale removed)
    pub fn world_rotation_matrix(&self, node: NodeKey) -> Option<Mat4> {
        self.world_pose(node).map(|(_, rotation, _)| rotation_from_euler(&rotation))
    }

    /// Lossy world scale of `node`, as recovered from its world matrix
    pub fn world_scale(&self, node: NodeKey) -> Option<Vec3> {
        self.world_pose(node).map(|(_, _, scale)| scale)
    }

    /// Overwrite the whole local pose of `node`
    pub fn set_local(&mut self, node: NodeKey, position: Vec3, rotation: Vec3, scale: Vec3) -> Result<(), SceneError> {
        self.write_transform(node, |transform| transform.set_local(position, rotation, scale))
    }

    /// Set the local position of `node`
    pub fn set_local_position(&mut self, node: NodeKey, position: Vec3) -> Result<(), SceneError> {
        self.write_transform(node, |transform| transform.set_position(position))
    }

    /// Set the local Euler rotation (radians) of `node`
    pub fn set_local_rotation(&mut self, node: NodeKey, rotation: Vec3) -> Result<(), SceneError> {
        self.write_transform(node, |transform| transform.set_rotation(rotation))
    }

    /// Set the local scale of `node`
    pub fn set_local_scale(&mut self, node: NodeKey, scale: Vec3) -> Result<(), SceneError> {
        self.write_transform(node, |transform| transform.set_scale(scale))
    }

    /// Offset the local position of `node`
    pub fn translate(&mut self, node: NodeKey, delta: Vec3) -> Result<(), SceneError> {
        self.write_transform(node, |transform| {
            let position = transform.local_position() + delta;
            transform.set_position(position);
        })
    }

    /// Add Euler angles (radians) to the local rotation of `node`
    pub fn rotate(&mut self, node: NodeKey, delta: Vec3) -> Result<(), SceneError> {
        self.write_transform(node, |transform| {
            let rotation = transform.local_rotation() + delta;
            transform.set_rotation(rotation);
        })
    }

    /// Move `node` so its world position becomes `position`
    ///
    /// For a parented node the target is converted into the parent's local
    /// space. Returns `Ok(false)` without changing anything when the parent's
    /// world matrix is singular (degenerate scale).
    pub fn set_world_position(&mut self, node: NodeKey, position: Vec3) -> Result<bool, SceneError> {
        let Some(entry) = self.nodes.get(node) else {
            warn!("set_world_position: node not found");
            return Err(SceneError::NodeNotFound);
        };

        let local = match entry.parent {
            Some(parent) => {
                let parent_world = self.world_matrix(parent).unwrap_or_else(Mat4::identity);
                match try_inverse(&parent_world, self.config.singular_epsilon) {
                    Some(inverse) => inverse.transform_point(&Point3::from(position)).coords,
                    None => {
                        debug!("set_world_position: parent of node {} is singular, ignoring", entry.id());
                        return Ok(false);
                    }
                }
            }
            None => position,
        };

        self.set_local_position(node, local)?;
        Ok(true)
    }

    fn write_transform(&mut self, node: NodeKey, write: impl FnOnce(&mut Transform)) -> Result<(), SceneError> {
        let Some(entry) = self.nodes.get_mut(node) else {
            warn!("Transform write on unknown node");
            return Err(SceneError::NodeNotFound);
        };
        write(&mut entry.transform);
        self.mark_subtree_dirty(node);
        Ok(())
    }

    /// Invalidate the cached world matrix of `node` and all descendants
    pub(crate) fn mark_subtree_dirty(&self, node: NodeKey) {
        let mut stack = vec![node];
        let mut first = true;
        while let Some(key) = stack.pop() {
            let Some(entry) = self.nodes.get(key) else {
                continue;
            };
            // A dirty node already has a dirty subtree.
            let newly_dirty = entry.transform.mark_dirty();
            if newly_dirty || first {
                stack.extend(entry.children.iter().copied());
            }
            first = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    #[test]
    fn test_root_world_is_local() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("A");
        scene
            .set_local(a, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.2, 0.4, 0.6), Vec3::new(1.0, 2.0, 3.0))
            .expect("write");

        let world = scene.world_matrix(a).expect("world");
        let local = scene.local_matrix(a).expect("local");
        assert_relative_eq!(world, local, epsilon = 1e-6);
    }

    #[test]
    fn test_child_composes_with_parent() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        scene.set_local_position(parent, Vec3::new(5.0, 0.0, 0.0)).expect("write");
        let child = scene.spawn_child(parent, "C").expect("child");
        scene.set_local_position(child, Vec3::new(2.0, 0.0, 0.0)).expect("write");

        assert_relative_eq!(scene.world_position(child).expect("pos"), Vec3::new(7.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_parent_rotation_and_scale_apply_to_child() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        scene
            .set_local(parent, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, HALF_PI, 0.0), Vec3::new(2.0, 2.0, 2.0))
            .expect("write");
        let child = scene.spawn_child(parent, "C").expect("child");
        scene.set_local_position(child, Vec3::new(0.0, 0.0, 1.0)).expect("write");

        // (0,0,1) scaled by 2, rotated 90deg about Y -> (2,0,0), then offset by (1,0,0)
        assert_relative_eq!(scene.world_position(child).expect("pos"), Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_dirty_propagates_to_descendants() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        let child = scene.spawn_child(parent, "C").expect("child");
        let grandchild = scene.spawn_child(child, "G").expect("grandchild");
        scene.world_matrix(grandchild);
        assert!(!scene.transform(grandchild).expect("t").is_dirty());

        scene.set_local_position(parent, Vec3::new(0.0, 4.0, 0.0)).expect("write");

        assert!(scene.transform(child).expect("t").is_dirty());
        assert!(scene.transform(grandchild).expect("t").is_dirty());
        assert_relative_eq!(
            scene.world_position(grandchild).expect("pos"),
            Vec3::new(0.0, 4.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_reading_does_not_clean_siblings() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        let a = scene.spawn_child(parent, "A").expect("a");
        let b = scene.spawn_child(parent, "B").expect("b");

        scene.world_matrix(a);

        assert!(!scene.transform(a).expect("t").is_dirty());
        assert!(scene.transform(b).expect("t").is_dirty());
    }

    #[test]
    fn test_basis_directions() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("A");
        assert_relative_eq!(scene.world_forward(a).expect("f"), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(scene.world_right(a).expect("r"), Vec3::x(), epsilon = 1e-6);
        assert_relative_eq!(scene.world_up(a).expect("u"), Vec3::y(), epsilon = 1e-6);

        scene.set_local_rotation(a, Vec3::new(0.0, HALF_PI, 0.0)).expect("write");
        scene.set_local_scale(a, Vec3::new(3.0, 3.0, 3.0)).expect("write");

        // Yaw by +90deg turns -Z forward into -X; scale must not leak into directions.
        assert_relative_eq!(scene.world_forward(a).expect("f"), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(scene.world_right(a).expect("r"), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_world_scale_and_rotation() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        scene
            .set_local(parent, Vec3::zeros(), Vec3::new(0.0, 0.0, HALF_PI), Vec3::new(2.0, 2.0, 2.0))
            .expect("write");
        let child = scene.spawn_child(parent, "C").expect("child");
        scene.set_local_scale(child, Vec3::new(1.5, 1.5, 1.5)).expect("write");

        assert_relative_eq!(scene.world_scale(child).expect("scale"), Vec3::new(3.0, 3.0, 3.0), epsilon = 1e-5);
        let rotation = scene.world_rotation_matrix(child).expect("rotation");
        assert_relative_eq!(rotation, rotation_from_euler(&Vec3::new(0.0, 0.0, HALF_PI)), epsilon = 1e-5);
    }

    #[test]
    fn test_set_world_position_under_parent() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        scene
            .set_local(parent, Vec3::new(5.0, 0.0, 0.0), Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0))
            .expect("write");
        let child = scene.spawn_child(parent, "C").expect("child");

        let applied = scene.set_world_position(child, Vec3::new(9.0, 2.0, 0.0)).expect("write");

        assert!(applied);
        assert_relative_eq!(scene.world_position(child).expect("pos"), Vec3::new(9.0, 2.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(
            scene.transform(child).expect("t").local_position(),
            Vec3::new(2.0, 1.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_set_world_position_with_singular_parent_is_noop() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        scene.set_local_scale(parent, Vec3::new(0.0, 1.0, 1.0)).expect("write");
        let child = scene.spawn_child(parent, "C").expect("child");
        scene.set_local_position(child, Vec3::new(1.0, 1.0, 1.0)).expect("write");

        let applied = scene.set_world_position(child, Vec3::new(4.0, 4.0, 4.0)).expect("call");

        assert!(!applied);
        assert_eq!(scene.transform(child).expect("t").local_position(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_set_world_position_on_root_writes_local() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("A");
        scene.set_world_position(a, Vec3::new(1.0, 2.0, 3.0)).expect("write");
        assert_eq!(scene.transform(a).expect("t").local_position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_unknown_node_writes_fail() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("A");
        scene.destroy(a).expect("destroy");
        assert!(matches!(scene.translate(a, Vec3::x()), Err(SceneError::NodeNotFound)));
        assert!(scene.world_matrix(a).is_none());
    }
}
