//! Built-in components
//!
//! Small, reusable behaviors shipped with the scene core. Each one persists
//! through [`ComponentData`] and can be rebuilt with [`from_data`].

mod lifetime;
mod mesh_renderer;
mod mover;
mod rotator;

pub use lifetime::Lifetime;
pub use mesh_renderer::MeshRenderer;
pub use mover::{Mover, Space};
pub use rotator::Rotator;

use log::warn;

use crate::scene::serializer::ComponentData;
use crate::scene::Component;

/// Rebuild a component from its serialized form
///
/// Unknown component types yield `None` and a warning.
pub fn from_data(data: &ComponentData) -> Option<Box<dyn Component>> {
    let component: Box<dyn Component> = match data {
        ComponentData::Rotator { speed } => Box::new(Rotator::new((*speed).into())),
        ComponentData::Mover { velocity, world_space } => {
            let space = if *world_space { Space::World } else { Space::Local };
            Box::new(Mover::new((*velocity).into(), space))
        }
        ComponentData::Lifetime { duration, elapsed } => Box::new(Lifetime {
            duration: *duration,
            elapsed: *elapsed,
        }),
        ComponentData::MeshRenderer { mesh, material, visible } => {
            let mut renderer = MeshRenderer::new(mesh.clone(), material.clone());
            renderer.visible = *visible;
            Box::new(renderer)
        }
        ComponentData::Unknown => {
            warn!("Skipping component of unknown type");
            return None;
        }
    };
    Some(component)
}
