//! Component attachment, per-frame update traversal and node destruction
//!
//! Hooks run with the component's boxed behavior moved out of its slot, so
//! the hook can borrow the whole graph mutably through a [`NodeContext`].
//! Every node whose hook is running sits on `hook_stack`; destroying such a
//! node (or one of its ancestors) is deferred until the hook returns.

use std::any::TypeId;

use log::{debug, trace, warn};

use crate::foundation::collections::{ComponentId, NodeKey};
use crate::scene::component::ComponentSlot;
use crate::scene::{Component, NodeContext, SceneError, SceneGraph, Transform};

impl SceneGraph {
    // ── Attachment ─────────────────────────────────────────────────────────

    /// Attach `component` to `node` and run its `on_attach` hook
    ///
    /// Adding a second instance of a unique type (the transform included)
    /// is rejected with a warning and returns the existing component's id.
    pub fn add_component<C: Component>(&mut self, node: NodeKey, component: C) -> Result<ComponentId, SceneError> {
        self.add_boxed_component(node, Box::new(component))
    }

    /// Attach an already boxed component; see [`add_component`](Self::add_component)
    pub fn add_boxed_component(&mut self, node: NodeKey, component: Box<dyn Component>) -> Result<ComponentId, SceneError> {
        let Some(entry) = self.nodes.get_mut(node) else {
            warn!("add_component: node not found");
            return Err(SceneError::NodeNotFound);
        };
        if entry.destroying {
            warn!("add_component: node {} is being destroyed", entry.id());
            return Err(SceneError::NodeDestroying(entry.id()));
        }

        let type_id = component.as_any().type_id();
        if type_id == TypeId::of::<Transform>() {
            warn!("Node {} already has a transform, ignoring add", entry.id());
            return Ok(entry.transform_id());
        }
        if component.is_unique() {
            if let Some(existing) = entry
                .components
                .iter()
                .find(|slot| slot.type_id == type_id && !slot.detaching)
            {
                warn!(
                    "Node {} already has a '{}' component, keeping the existing one",
                    entry.id(),
                    existing.type_name
                );
                return Ok(existing.id);
            }
        }

        let slot = ComponentSlot::new(component);
        let id = slot.id;
        trace!("Attaching '{}' to node {}", slot.type_name, entry.id());
        entry.components.push(slot);

        self.with_component(node, id, |component, ctx| component.on_attach(ctx));
        Ok(id)
    }

    /// Detach a component, running its `on_detach` hook
    ///
    /// A component removed while one of its own hooks is running is detached
    /// as soon as that hook returns.
    pub fn remove_component(&mut self, node: NodeKey, component: ComponentId) -> Result<(), SceneError> {
        let Some(entry) = self.nodes.get_mut(node) else {
            warn!("remove_component: node not found");
            return Err(SceneError::NodeNotFound);
        };
        let node_id = entry.id();
        if component == entry.transform_id() {
            warn!("Refusing to remove the transform of node {}", node_id);
            return Err(SceneError::TransformRemoval(node_id));
        }
        let Some(slot) = entry.slot_mut(component) else {
            warn!("remove_component: component not attached to node {}", node_id);
            return Err(SceneError::ComponentNotFound(node_id));
        };
        if slot.detaching {
            return Ok(());
        }

        slot.detaching = true;
        let behavior = slot.behavior.take();
        match behavior {
            Some(behavior) => {
                self.finish_detach(node, component, behavior);
                self.flush_deferred();
            }
            None => {
                // Its own hook is running; `with_component` completes the detach.
                if let Some(slot) = self.nodes.get_mut(node).and_then(|entry| entry.slot_mut(component)) {
                    slot.detach_requested = true;
                }
            }
        }
        Ok(())
    }

    /// Detach the first component of type `T`
    ///
    /// Returns `Ok(false)` when the node has no such component.
    pub fn remove_component_of<T: Component>(&mut self, node: NodeKey) -> Result<bool, SceneError> {
        let Some(entry) = self.nodes.get(node) else {
            warn!("remove_component_of: node not found");
            return Err(SceneError::NodeNotFound);
        };
        if TypeId::of::<T>() == TypeId::of::<Transform>() {
            warn!("Refusing to remove the transform of node {}", entry.id());
            return Err(SceneError::TransformRemoval(entry.id()));
        }
        let found = entry
            .components
            .iter()
            .find(|slot| slot.is::<T>() && !slot.detaching)
            .map(|slot| slot.id);
        match found {
            Some(id) => self.remove_component(node, id).map(|()| true),
            None => Ok(false),
        }
    }

    /// First component of type `T` on `node`
    ///
    /// `T = Transform` yields the node's transform. A component whose hook is
    /// currently running is not reachable.
    pub fn get_component<T: Component>(&self, node: NodeKey) -> Option<&T> {
        let entry = self.nodes.get(node)?;
        if let Some(transform) = (&entry.transform as &dyn Component).as_any().downcast_ref::<T>() {
            return Some(transform);
        }
        entry
            .components
            .iter()
            .filter(|slot| slot.is::<T>() && !slot.detaching)
            .find_map(ComponentSlot::downcast_ref::<T>)
    }

    /// Mutable access to the first component of type `T`
    ///
    /// The transform is not handed out mutably; use the transform setters on
    /// the graph so the subtree gets invalidated.
    pub fn get_component_mut<T: Component>(&mut self, node: NodeKey) -> Option<&mut T> {
        self.nodes
            .get_mut(node)?
            .components
            .iter_mut()
            .filter(|slot| slot.is::<T>() && !slot.detaching)
            .find_map(ComponentSlot::downcast_mut::<T>)
    }

    /// Every component of type `T` on `node`, in attachment order
    pub fn get_components<T: Component>(&self, node: NodeKey) -> Vec<&T> {
        let Some(entry) = self.nodes.get(node) else {
            return Vec::new();
        };
        if let Some(transform) = (&entry.transform as &dyn Component).as_any().downcast_ref::<T>() {
            return vec![transform];
        }
        entry
            .components
            .iter()
            .filter(|slot| slot.is::<T>() && !slot.detaching)
            .filter_map(ComponentSlot::downcast_ref::<T>)
            .collect()
    }

    /// Component by handle, downcast to `T`
    pub fn component<T: Component>(&self, node: NodeKey, component: ComponentId) -> Option<&T> {
        self.nodes.get(node)?.slot(component)?.downcast_ref::<T>()
    }

    /// Mutable component by handle, downcast to `T`
    pub fn component_mut<T: Component>(&mut self, node: NodeKey, component: ComponentId) -> Option<&mut T> {
        self.nodes.get_mut(node)?.slot_mut(component)?.downcast_mut::<T>()
    }

    /// Enable or disable per-frame updates of a component
    pub fn set_component_enabled(&mut self, node: NodeKey, component: ComponentId, enabled: bool) -> Result<(), SceneError> {
        let Some(entry) = self.nodes.get_mut(node) else {
            warn!("set_component_enabled: node not found");
            return Err(SceneError::NodeNotFound);
        };
        if component == entry.transform_id() {
            return Ok(());
        }
        let node_id = entry.id();
        let Some(slot) = entry.slot_mut(component) else {
            warn!("set_component_enabled: component not attached to node {}", node_id);
            return Err(SceneError::ComponentNotFound(node_id));
        };
        slot.enabled = enabled;
        Ok(())
    }

    // ── Hook dispatch ──────────────────────────────────────────────────────

    /// Run `hook` on a component with the graph borrowed through a context
    ///
    /// Returns `false` if the component is gone or its behavior is already
    /// out running another hook.
    pub(crate) fn with_component(
        &mut self,
        node: NodeKey,
        component: ComponentId,
        hook: impl FnOnce(&mut dyn Component, &mut NodeContext<'_>),
    ) -> bool {
        let Some(slot) = self.nodes.get_mut(node).and_then(|entry| entry.slot_mut(component)) else {
            return false;
        };
        let Some(mut behavior) = slot.behavior.take() else {
            return false;
        };
        slot.snapshot = behavior.to_data();

        self.run_hook(node, component, behavior.as_mut(), hook);

        let detach_requested = self
            .nodes
            .get(node)
            .and_then(|entry| entry.slot(component))
            .map(|slot| slot.detach_requested);
        match detach_requested {
            Some(false) => {
                if let Some(slot) = self.nodes.get_mut(node).and_then(|entry| entry.slot_mut(component)) {
                    slot.behavior = Some(behavior);
                    slot.snapshot = None;
                }
            }
            Some(true) => self.finish_detach(node, component, behavior),
            None => trace!("Component slot vanished during hook, dropping behavior"),
        }

        self.flush_deferred();
        true
    }

    fn run_hook(
        &mut self,
        node: NodeKey,
        component: ComponentId,
        behavior: &mut dyn Component,
        hook: impl FnOnce(&mut dyn Component, &mut NodeContext<'_>),
    ) {
        self.hook_stack.push(node);
        {
            let mut ctx = NodeContext::new(self, node, component);
            hook(behavior, &mut ctx);
        }
        self.hook_stack.pop();
    }

    /// Deliver `on_detach` and drop the slot
    fn finish_detach(&mut self, node: NodeKey, component: ComponentId, mut behavior: Box<dyn Component>) {
        self.run_hook(node, component, behavior.as_mut(), |component, ctx| component.on_detach(ctx));

        if let Some(entry) = self.nodes.get_mut(node) {
            if let Some(position) = entry.slot_position(component) {
                let slot = entry.components.remove(position);
                debug!("Detached '{}' from node {}", slot.type_name, entry.id());
            }
        }
    }

    // ── Update traversal ───────────────────────────────────────────────────

    /// Update every root subtree, in root-list order
    ///
    /// Runs regardless of the loaded flag; [`advance`](Self::advance) is the
    /// gated per-frame entry point.
    pub fn update(&mut self, dt: f32) {
        self.bump_frame();
        let roots = self.roots.clone();
        for root in roots {
            let is_root = self
                .nodes
                .get(root)
                .is_some_and(|entry| entry.parent.is_none() && entry.indexed);
            if is_root {
                self.update_node(root, dt);
            }
        }
    }

    fn update_node(&mut self, node: NodeKey, dt: f32) {
        let frame = self.frame_count();
        let Some(entry) = self.nodes.get_mut(node) else {
            return;
        };
        if !entry.is_active() || entry.destroy_pending || entry.destroying {
            return;
        }
        // Reparented under a later sibling after its visit this frame.
        if entry.updated_frame == frame {
            return;
        }
        entry.updated_frame = frame;

        let components: Vec<ComponentId> = entry.components.iter().map(|slot| slot.id).collect();
        for component in components {
            let Some(entry) = self.nodes.get_mut(node) else {
                return;
            };
            if entry.destroy_pending {
                break;
            }
            let Some(slot) = entry.slot_mut(component) else {
                continue;
            };
            if !slot.enabled || slot.detaching {
                continue;
            }

            if !slot.started {
                slot.started = true;
                self.with_component(node, component, |component, ctx| component.on_start(ctx));
                let still_enabled = self
                    .nodes
                    .get(node)
                    .and_then(|entry| entry.slot(component))
                    .is_some_and(|slot| slot.enabled && !slot.detaching);
                if !still_enabled {
                    continue;
                }
            }
            self.with_component(node, component, |component, ctx| component.on_update(ctx, dt));
        }

        let Some(entry) = self.nodes.get(node) else {
            return;
        };
        if !entry.is_active() || entry.destroy_pending {
            return;
        }
        let children = entry.children.clone();
        for child in children {
            let still_child = self.nodes.get(child).is_some_and(|entry| entry.parent == Some(node));
            if still_child {
                self.update_node(child, dt);
            }
        }
    }

    // ── Destruction ────────────────────────────────────────────────────────

    /// Destroy `node`, its subtree and all their components
    ///
    /// Children are destroyed first, then every component is detached, then
    /// the node is unlinked and unindexed. If a hook is running on the node
    /// or one of its descendants, destruction happens once that hook returns.
    pub fn destroy(&mut self, node: NodeKey) -> Result<(), SceneError> {
        let Some(entry) = self.nodes.get_mut(node) else {
            warn!("destroy: node not found");
            return Err(SceneError::NodeNotFound);
        };
        if entry.destroying || entry.destroy_pending {
            return Ok(());
        }

        if self.hook_running_within(node) {
            if let Some(entry) = self.nodes.get_mut(node) {
                entry.destroy_pending = true;
                debug!("Deferring destroy of node {} until its hook returns", entry.id());
            }
            self.deferred_destroy.push(node);
            return Ok(());
        }

        self.destroy_now(node);
        Ok(())
    }

    fn hook_running_within(&self, node: NodeKey) -> bool {
        self.hook_stack
            .iter()
            .any(|&running| running == node || self.is_ancestor_of(node, running))
    }

    fn destroy_now(&mut self, node: NodeKey) {
        let Some(entry) = self.nodes.get_mut(node) else {
            return;
        };
        entry.destroying = true;
        entry.destroy_pending = false;
        let id = entry.id();
        let children = entry.children.clone();

        for child in children {
            if self.nodes.get(child).is_some_and(|entry| entry.parent == Some(node)) {
                self.destroy_now(child);
            }
        }

        let components: Vec<ComponentId> = self
            .nodes
            .get(node)
            .map(|entry| entry.components.iter().map(|slot| slot.id).collect())
            .unwrap_or_default();
        for component in components {
            let behavior = self
                .nodes
                .get_mut(node)
                .and_then(|entry| entry.slot_mut(component))
                .filter(|slot| !slot.detaching)
                .and_then(|slot| {
                    slot.detaching = true;
                    slot.behavior.take()
                });
            if let Some(behavior) = behavior {
                self.finish_detach(node, component, behavior);
            }
        }

        // Children attached by `on_detach` hooks during teardown.
        loop {
            let late: Vec<NodeKey> = self
                .nodes
                .get(node)
                .map(|entry| entry.children.clone())
                .unwrap_or_default();
            let late: Vec<NodeKey> = late
                .into_iter()
                .filter(|&child| self.nodes.get(child).is_some_and(|entry| entry.parent == Some(node)))
                .collect();
            if late.is_empty() {
                break;
            }
            for child in late {
                self.destroy_now(child);
            }
        }

        let parent = self.nodes.get(node).and_then(|entry| entry.parent);
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(parent)) {
            parent.children.retain(|&child| child != node);
        }
        self.roots.retain(|&root| root != node);
        self.index.remove(&id);
        self.deferred_destroy.retain(|&pending| pending != node);
        self.nodes.remove(node);
        debug!("Destroyed node {} in scene '{}'", id, self.config.name);
    }

    /// Destroy deferred nodes whose subtrees no longer run any hook
    pub(crate) fn flush_deferred(&mut self) {
        if self.deferred_destroy.is_empty() {
            return;
        }
        let pending = self.deferred_destroy.clone();
        for node in pending {
            if !self.nodes.contains_key(node) {
                self.deferred_destroy.retain(|&key| key != node);
                continue;
            }
            if !self.hook_running_within(node) {
                self.deferred_destroy.retain(|&key| key != node);
                self.destroy_now(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_component_any;
    use crate::scene::ComponentState;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        label: &'static str,
        log: Log,
    }

    impl Probe {
        fn new(label: &'static str, log: &Log) -> Self {
            Self {
                label,
                log: Rc::clone(log),
            }
        }

        fn record(&self, event: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.label, event));
        }
    }

    impl Component for Probe {
        fn type_name(&self) -> &'static str {
            "probe"
        }

        fn on_attach(&mut self, _ctx: &mut NodeContext<'_>) {
            self.record("attach");
        }

        fn on_start(&mut self, _ctx: &mut NodeContext<'_>) {
            self.record("start");
        }

        fn on_update(&mut self, _ctx: &mut NodeContext<'_>, _dt: f32) {
            self.record("update");
        }

        fn on_detach(&mut self, _ctx: &mut NodeContext<'_>) {
            self.record("detach");
        }

        impl_component_any!();
    }

    struct Singleton;

    impl Component for Singleton {
        fn type_name(&self) -> &'static str {
            "singleton"
        }

        fn is_unique(&self) -> bool {
            true
        }

        impl_component_any!();
    }

    fn events(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn test_attach_runs_immediately() {
        let log = Log::default();
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");

        let id = scene.add_component(node, Probe::new("p", &log)).expect("add");

        assert_eq!(events(&log), vec!["p:attach"]);
        assert_eq!(
            scene.node(node).expect("node").component_state(id),
            ComponentState::Attached { started: false }
        );
    }

    #[test]
    fn test_start_once_before_first_update() {
        let log = Log::default();
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");
        let id = scene.add_component(node, Probe::new("p", &log)).expect("add");

        scene.update(0.1);
        scene.update(0.1);

        assert_eq!(events(&log), vec!["p:attach", "p:start", "p:update", "p:update"]);
        assert_eq!(
            scene.node(node).expect("node").component_state(id),
            ComponentState::Attached { started: true }
        );
    }

    #[test]
    fn test_update_order_is_attachment_order() {
        let log = Log::default();
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");
        scene.add_component(node, Probe::new("first", &log)).expect("add");
        scene.add_component(node, Probe::new("second", &log)).expect("add");
        log.borrow_mut().clear();

        scene.update(0.1);

        assert_eq!(
            events(&log),
            vec!["first:start", "first:update", "second:start", "second:update"]
        );
    }

    #[test]
    fn test_disabled_component_is_not_updated() {
        let log = Log::default();
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");
        let id = scene.add_component(node, Probe::new("p", &log)).expect("add");
        scene.set_component_enabled(node, id, false).expect("disable");
        log.borrow_mut().clear();

        scene.update(0.1);
        assert!(events(&log).is_empty());

        scene.set_component_enabled(node, id, true).expect("enable");
        scene.update(0.1);
        assert_eq!(events(&log), vec!["p:start", "p:update"]);
    }

    #[test]
    fn test_remove_component_detaches_once() {
        let log = Log::default();
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");
        let id = scene.add_component(node, Probe::new("p", &log)).expect("add");

        scene.remove_component(node, id).expect("remove");
        let second = scene.remove_component(node, id);

        assert!(matches!(second, Err(SceneError::ComponentNotFound(_))));
        assert_eq!(events(&log), vec!["p:attach", "p:detach"]);
        assert_eq!(scene.node(node).expect("node").component_state(id), ComponentState::Detached);
        assert_eq!(scene.node(node).expect("node").component_count(), 1);
    }

    #[test]
    fn test_transform_cannot_be_removed_or_duplicated() {
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");
        let transform_id = scene.node(node).expect("node").transform_id();

        let removed = scene.remove_component(node, transform_id);
        assert!(matches!(removed, Err(SceneError::TransformRemoval(_))));
        assert!(matches!(
            scene.remove_component_of::<Transform>(node),
            Err(SceneError::TransformRemoval(_))
        ));

        let added = scene.add_component(node, Transform::default()).expect("add");
        assert_eq!(added, transform_id);
        assert_eq!(scene.node(node).expect("node").component_count(), 1);
        assert!(scene.get_component::<Transform>(node).is_some());
    }

    #[test]
    fn test_unique_component_returns_existing() {
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");
        let first = scene.add_component(node, Singleton).expect("add");
        let second = scene.add_component(node, Singleton).expect("add");

        assert_eq!(first, second);
        assert_eq!(scene.get_components::<Singleton>(node).len(), 1);
    }

    #[test]
    fn test_get_components_and_remove_of() {
        let log = Log::default();
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");
        scene.add_component(node, Probe::new("a", &log)).expect("add");
        scene.add_component(node, Probe::new("b", &log)).expect("add");

        let labels: Vec<&str> = scene.get_components::<Probe>(node).iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(scene.get_component::<Probe>(node).map(|p| p.label), Some("a"));

        assert!(scene.remove_component_of::<Probe>(node).expect("remove"));
        assert_eq!(scene.get_component::<Probe>(node).map(|p| p.label), Some("b"));
        assert!(!scene.remove_component_of::<Singleton>(node).expect("remove"));
    }

    #[test]
    fn test_destroy_detaches_children_first() {
        let log = Log::default();
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        let child = scene.spawn_child(parent, "C").expect("child");
        scene.add_component(parent, Probe::new("parent", &log)).expect("add");
        scene.add_component(child, Probe::new("child", &log)).expect("add");
        log.borrow_mut().clear();

        scene.destroy(parent).expect("destroy");

        assert_eq!(events(&log), vec!["child:detach", "parent:detach"]);
        assert!(!scene.contains(parent));
        assert!(!scene.contains(child));
        assert!(scene.is_empty());
        assert!(scene.roots().is_empty());
    }

    #[test]
    fn test_destroy_child_unlinks_from_parent() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        let a = scene.spawn_child(parent, "A").expect("a");
        let b = scene.spawn_child(parent, "B").expect("b");

        scene.destroy(a).expect("destroy");

        assert_eq!(scene.children(parent), &[b]);
        assert!(matches!(scene.destroy(a), Err(SceneError::NodeNotFound)));
    }

    #[test]
    fn test_add_component_to_missing_node_fails() {
        let mut scene = SceneGraph::new();
        let node = scene.spawn("A");
        scene.destroy(node).expect("destroy");
        assert!(matches!(scene.add_component(node, Singleton), Err(SceneError::NodeNotFound)));
    }
}
