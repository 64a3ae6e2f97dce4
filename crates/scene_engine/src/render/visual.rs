//! Backend abstraction for visual representations

use crate::foundation::collections::NodeId;
use crate::foundation::math::Mat4;

/// Opaque handle to a visual owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualHandle(pub u64);

/// What a renderable asks the renderer to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualDesc {
    /// Node the visual belongs to
    pub node: NodeId,
    
    /// Mesh asset name
    pub mesh: String,
    
    /// Material asset name
    pub material: String,
}

/// Rendering backend consumed by the scene
///
/// A visual is bound once, submitted with its node's world matrix on every
/// sync, and released when its renderable detaches.
pub trait Renderer {
    /// Create a visual and return its handle
    fn bind(&mut self, desc: &VisualDesc) -> VisualHandle;
    
    /// Draw a bound visual with the given world matrix this frame
    fn submit(&mut self, handle: VisualHandle, world: &Mat4);
    
    /// Destroy a bound visual
    fn release(&mut self, handle: VisualHandle);
}
