//! # Renderer Collaborator
//!
//! The scene core does not draw anything. It binds an opaque visual once per
//! renderable and hands the renderer the node's world matrix every frame:
//!
//! - **Renderer**: backend seam (`bind` / `submit` / `release`)
//! - **RecordingRenderer**: in-memory backend for tests and tooling
//! - **sync**: [`SceneGraph::sync_visuals`](crate::scene::SceneGraph::sync_visuals),
//!   the per-frame collection pass over the active hierarchy

mod recording;
mod sync;
mod visual;

pub use recording::{RecordingRenderer, Submission};
pub use visual::{Renderer, VisualDesc, VisualHandle};
