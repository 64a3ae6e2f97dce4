//! Constant linear velocity

use log::warn;

use crate::foundation::math::{Mat4, Vec3};
use crate::impl_component_any;
use crate::scene::serializer::ComponentData;
use crate::scene::{Component, NodeContext};

/// Frame of reference for a velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Space {
    /// Along the node's own axes
    #[default]
    Local,
    /// Along world axes, regardless of parent or own rotation
    World,
}

/// Moves its node at a constant velocity
#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    /// Units per second
    pub velocity: Vec3,
    
    /// Axes the velocity is expressed in
    pub space: Space,
}

impl Mover {
    /// Create a mover
    pub fn new(velocity: Vec3, space: Space) -> Self {
        Self { velocity, space }
    }
}

impl Component for Mover {
    fn type_name(&self) -> &'static str {
        "mover"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_>, dt: f32) {
        let step = self.velocity * dt;
        let result = match self.space {
            Space::Local => {
                let rotation = ctx
                    .transform()
                    .map(|transform| transform.local_rotation_matrix())
                    .unwrap_or_else(Mat4::identity);
                ctx.translate(rotation.transform_vector(&step))
            }
            Space::World => match ctx.world_position() {
                Some(position) => ctx.set_world_position(position + step).map(|_| ()),
                None => Ok(()),
            },
        };
        if let Err(err) = result {
            warn!("Mover update failed: {}", err);
        }
    }

    fn to_data(&self) -> Option<ComponentData> {
        Some(ComponentData::Mover {
            velocity: self.velocity.into(),
            world_space: self.space == Space::World,
        })
    }

    impl_component_any!();
}
