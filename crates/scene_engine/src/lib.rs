//! # Scene Engine
//!
//! Scene graph and component lifecycle core for a small game engine.
//!
//! ## Features
//!
//! - **Scene Graph**: arena-backed node tree with an id index, reparenting
//!   with cycle rejection and ordered siblings
//! - **Transforms**: local TRS poses with lazily cached world matrices
//! - **Components**: attach/start/update/detach lifecycle with safe
//!   structural edits from inside hooks
//! - **Persistence**: JSON and RON scene files through serde
//! - **Renderer Seam**: per-frame visual sync against any backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = SceneGraph::with_config(SceneConfig::named("Demo"));
//!     let planet = scene.spawn("Planet");
//!     scene.add_component(planet, Rotator::new(Vec3::new(0.0, 1.0, 0.0)))?;
//!     scene.load()?;
//!
//!     let mut renderer = RecordingRenderer::new();
//!     scene.advance(1.0 / 60.0);
//!     scene.sync_visuals(&mut renderer);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        foundation::{
            collections::{ComponentId, NodeId, NodeKey},
            math::{Mat4, Vec3},
            time::{FixedStep, FrameTimer},
        },
        render::{RecordingRenderer, Renderer, VisualDesc, VisualHandle},
        scene::{
            components::{Lifetime, MeshRenderer, Mover, Rotator, Space},
            Component, ComponentState, Node, NodeContext, SceneError, SceneGraph, SceneManager,
            SceneSerializer, Transform,
        },
    };
}
