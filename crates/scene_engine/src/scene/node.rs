//! Scene node: a tree entity with a transform and ordered components
//!
//! Nodes are owned by the [`SceneGraph`](super::SceneGraph) arena and linked
//! through [`NodeKey`] handles. The parent link is non-owning: a parent key
//! that no longer resolves is simply absent. Children are ordered; the order
//! is the sibling index and the traversal order.

use crate::foundation::collections::{ComponentId, NodeId, NodeKey};
use crate::scene::component::{ComponentSlot, ComponentState};
use crate::scene::Transform;

/// A node in the scene tree
pub struct Node {
    id: NodeId,
    name: String,
    tag: String,
    active: bool,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) transform: Transform,
    transform_id: ComponentId,
    pub(crate) components: Vec<ComponentSlot>,
    pub(crate) indexed: bool,
    pub(crate) destroying: bool,
    pub(crate) destroy_pending: bool,
    /// Last frame whose update reached this node
    pub(crate) updated_frame: u64,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("active", &self.active)
            .field("children", &self.children.len())
            .field("components", &self.component_type_names())
            .finish()
    }
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            tag: tag.into(),
            active: true,
            parent: None,
            children: Vec::new(),
            transform: Transform::default(),
            transform_id: ComponentId::next(),
            components: Vec::new(),
            indexed: false,
            destroying: false,
            destroy_pending: false,
            updated_frame: 0,
        }
    }

    /// Process-unique id, stable for the node's lifetime
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Human-readable name (not unique)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Classification tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Change the classification tag
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Whether this node's own active flag is set
    ///
    /// See [`SceneGraph::active_in_hierarchy`](super::SceneGraph::active_in_hierarchy)
    /// for the effective state including ancestors.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set the node's own active flag
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Parent handle, `None` for a root
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in sibling order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// The node's transform (read-only; writes go through the scene graph
    /// so the subtree can be invalidated)
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Handle of the implicit transform component
    pub fn transform_id(&self) -> ComponentId {
        self.transform_id
    }

    /// Whether the node is present in its scene's id index
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Whether a destroy has been requested but deferred
    pub fn is_destroy_pending(&self) -> bool {
        self.destroy_pending
    }

    /// Number of components including the transform
    pub fn component_count(&self) -> usize {
        1 + self.components.len()
    }

    /// Component handles in attachment order, transform first
    pub fn component_ids(&self) -> Vec<ComponentId> {
        std::iter::once(self.transform_id)
            .chain(self.components.iter().map(|slot| slot.id))
            .collect()
    }

    /// Component type tags in attachment order, transform first
    pub fn component_type_names(&self) -> Vec<&'static str> {
        std::iter::once("transform")
            .chain(self.components.iter().map(|slot| slot.type_name))
            .collect()
    }

    /// Whether the component is attached and enabled
    pub fn component_enabled(&self, component: ComponentId) -> Option<bool> {
        if component == self.transform_id {
            return Some(true);
        }
        self.slot(component).map(|slot| slot.enabled)
    }

    /// Lifecycle state of an attached component
    ///
    /// Components no longer on the node report [`ComponentState::Detached`].
    pub fn component_state(&self, component: ComponentId) -> ComponentState {
        if component == self.transform_id {
            return ComponentState::Attached { started: true };
        }
        self.slot(component).map_or(ComponentState::Detached, ComponentSlot::state)
    }

    pub(crate) fn slot(&self, component: ComponentId) -> Option<&ComponentSlot> {
        self.components.iter().find(|slot| slot.id == component)
    }

    pub(crate) fn slot_mut(&mut self, component: ComponentId) -> Option<&mut ComponentSlot> {
        self.components.iter_mut().find(|slot| slot.id == component)
    }

    pub(crate) fn slot_position(&self, component: ComponentId) -> Option<usize> {
        self.components.iter().position(|slot| slot.id == component)
    }
}
