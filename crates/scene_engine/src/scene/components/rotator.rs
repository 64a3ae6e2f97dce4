//! Constant angular velocity

use log::warn;

use crate::foundation::math::Vec3;
use crate::impl_component_any;
use crate::scene::serializer::ComponentData;
use crate::scene::{Component, NodeContext};

/// Spins its node by `speed` radians per second around each local axis
#[derive(Debug, Clone, PartialEq)]
pub struct Rotator {
    /// Euler angle rate in radians per second
    pub speed: Vec3,
}

impl Rotator {
    /// Create a rotator
    pub fn new(speed: Vec3) -> Self {
        Self { speed }
    }
}

impl Component for Rotator {
    fn type_name(&self) -> &'static str {
        "rotator"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_>, dt: f32) {
        if let Err(err) = ctx.rotate(self.speed * dt) {
            warn!("Rotator update failed: {}", err);
        }
    }

    fn to_data(&self) -> Option<ComponentData> {
        Some(ComponentData::Rotator {
            speed: self.speed.into(),
        })
    }

    impl_component_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotator_accumulates_rotation() {
        let mut scene = SceneGraph::new();
        let node = scene.spawn("Spinner");
        scene.add_component(node, Rotator::new(Vec3::new(0.0, 1.0, 0.0))).expect("add");

        scene.update(0.5);
        scene.update(0.25);

        let rotation = scene.transform(node).expect("transform").local_rotation();
        assert_relative_eq!(rotation, Vec3::new(0.0, 0.75, 0.0), epsilon = 1e-6);
    }
}
