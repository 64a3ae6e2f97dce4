//! Component trait and per-node component bookkeeping
//!
//! A component is a behavior attached to exactly one node. Its lifecycle is
//!
//! ```text
//! Attached { started: false } --first update--> Attached { started: true }
//!        \                                              /
//!         `------------------> Detached <--------------'
//! ```
//!
//! `on_attach` runs synchronously when the component is added, `on_start`
//! runs once right before the first `on_update`, and `on_detach` runs once
//! when the component is removed or its node is destroyed. A detached
//! instance is dropped and never reused.
//!
//! Hooks receive a [`NodeContext`] giving full mutable access to the scene
//! graph, so a component may restructure the scene from inside any hook.

use std::any::{Any, TypeId};

use crate::foundation::collections::ComponentId;
use crate::scene::serializer::ComponentData;
use crate::scene::NodeContext;

/// Behavior attached to a node
pub trait Component: Any {
    /// Type tag used for logging and serialization
    fn type_name(&self) -> &'static str;

    /// Whether a node may hold at most one component of this type
    fn is_unique(&self) -> bool {
        false
    }

    /// Called once, synchronously, when the component is added to a node
    fn on_attach(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called once, right before the first `on_update`
    fn on_start(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called every frame while enabled and the node is active in hierarchy
    fn on_update(&mut self, _ctx: &mut NodeContext<'_>, _dt: f32) {}

    /// Called once when the component is removed or its node destroyed
    fn on_detach(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Serializable snapshot of this component, `None` if not persisted
    fn to_data(&self) -> Option<ComponentData> {
        None
    }

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Lifecycle state of an attached component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// Attached to a node; `started` once `on_start` has run
    Attached {
        /// Whether `on_start` has been delivered
        started: bool,
    },
    /// Removed from its node (terminal)
    Detached,
}

/// Storage slot for one attached component
///
/// The boxed behavior is moved out while one of its hooks runs, so the hook
/// can borrow the whole scene mutably. `snapshot` holds its serialized form
/// from just before the hook started. `detach_requested` records a removal
/// that arrived while the behavior was out.
pub(crate) struct ComponentSlot {
    pub(crate) id: ComponentId,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) enabled: bool,
    pub(crate) started: bool,
    pub(crate) detaching: bool,
    pub(crate) detach_requested: bool,
    pub(crate) behavior: Option<Box<dyn Component>>,
    pub(crate) snapshot: Option<ComponentData>,
}

impl ComponentSlot {
    pub(crate) fn new(behavior: Box<dyn Component>) -> Self {
        Self {
            id: ComponentId::next(),
            type_id: behavior.as_any().type_id(),
            type_name: behavior.type_name(),
            enabled: true,
            started: false,
            detaching: false,
            detach_requested: false,
            behavior: Some(behavior),
            snapshot: None,
        }
    }

    pub(crate) fn is<T: Component>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.behavior.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub(crate) fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.behavior.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Serialized form, taken from the pre-hook snapshot while a hook runs
    pub(crate) fn to_data(&self) -> Option<ComponentData> {
        match self.behavior.as_deref() {
            Some(behavior) => behavior.to_data(),
            None => self.snapshot.clone(),
        }
    }

    pub(crate) fn state(&self) -> ComponentState {
        if self.detaching {
            ComponentState::Detached
        } else {
            ComponentState::Attached { started: self.started }
        }
    }
}

/// Implements the `as_any` plumbing of [`Component`] for a concrete type
#[macro_export]
macro_rules! impl_component_any {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}
