//! Renderable binding a mesh/material pair to a node

use crate::foundation::collections::NodeId;
use crate::impl_component_any;
use crate::render::{VisualDesc, VisualHandle};
use crate::scene::serializer::ComponentData;
use crate::scene::{Component, NodeContext};

/// Draws a mesh with a material at its node's world transform
///
/// The visual is bound lazily by
/// [`SceneGraph::sync_visuals`](crate::scene::SceneGraph::sync_visuals) and
/// released when the component detaches. At most one per node.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderer {
    /// Mesh asset name
    pub mesh: String,
    
    /// Material asset name
    pub material: String,
    
    /// Whether this renderable is submitted
    pub visible: bool,
    
    pub(crate) visual: Option<VisualHandle>,
}

impl MeshRenderer {
    /// Create a visible renderable
    pub fn new(mesh: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            material: material.into(),
            visible: true,
            visual: None,
        }
    }

    /// Handle of the bound visual, once synced
    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    pub(crate) fn desc(&self, node: NodeId) -> VisualDesc {
        VisualDesc {
            node,
            mesh: self.mesh.clone(),
            material: self.material.clone(),
        }
    }
}

impl Component for MeshRenderer {
    fn type_name(&self) -> &'static str {
        "mesh_renderer"
    }

    fn is_unique(&self) -> bool {
        true
    }

    fn on_detach(&mut self, ctx: &mut NodeContext<'_>) {
        if let Some(handle) = self.visual.take() {
            ctx.release_visual(handle);
        }
    }

    fn to_data(&self) -> Option<ComponentData> {
        Some(ComponentData::MeshRenderer {
            mesh: self.mesh.clone(),
            material: self.material.clone(),
            visible: self.visible,
        })
    }

    impl_component_any!();
}
