//! Scene graph: node arena, id index, root list and scene lifecycle
//!
//! The graph owns every node it creates. Ownership flows from the graph to
//! the roots and from each node to its children; parent links are plain
//! [`NodeKey`]s and never keep anything alive.
//!
//! The id index is the single source of truth for "does this node exist in
//! the scene". Lookups by name and tag are linear scans over the index in id
//! order, which is creation order.
//!
//! ```text
//! Unloaded --load--> Loaded --unload--> Unloaded
//!                    Loaded --clear---> Loaded (empty)
//! ```

use std::collections::BTreeMap;

use log::{debug, trace, warn};

use crate::config::SceneConfig;
use crate::foundation::collections::{NodeId, NodeKey, SlotMap};
use crate::render::VisualHandle;
use crate::scene::{Node, SceneError};

/// Owning structure for a tree of nodes
pub struct SceneGraph {
    pub(crate) config: SceneConfig,
    pub(crate) nodes: SlotMap<NodeKey, Node>,
    pub(crate) index: BTreeMap<NodeId, NodeKey>,
    pub(crate) roots: Vec<NodeKey>,
    loaded: bool,
    /// Nodes whose component hook is currently executing, innermost last
    pub(crate) hook_stack: Vec<NodeKey>,
    /// Destroy requests postponed until no hook runs inside their subtree
    pub(crate) deferred_destroy: Vec<NodeKey>,
    pub(crate) released_visuals: Vec<VisualHandle>,
    frame: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGraph")
            .field("name", &self.config.name)
            .field("loaded", &self.loaded)
            .field("indexed", &self.index.len())
            .field("roots", &self.roots.len())
            .field("frame", &self.frame)
            .finish()
    }
}

impl SceneGraph {
    /// Create an empty, unloaded scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty, unloaded scene
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            nodes: SlotMap::with_key(),
            index: BTreeMap::new(),
            roots: Vec::new(),
            loaded: false,
            hook_stack: Vec::new(),
            deferred_destroy: Vec::new(),
            released_visuals: Vec::new(),
            frame: 0,
        }
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    // ── Creation and indexing ──────────────────────────────────────────────

    /// Create a node in the arena without indexing it
    ///
    /// The node gets a fresh id and its transform. It is invisible to lookups
    /// and updates until passed to [`add_node`](Self::add_node) or parented
    /// under an indexed node.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeKey {
        let node = Node::new(name, self.config.default_tag.clone());
        let id = node.id();
        let key = self.nodes.insert(node);
        trace!("Created node {} in scene '{}'", id, self.config.name);
        key
    }

    /// Create a node and add it to the scene as a root
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeKey {
        let key = self.create_node(name);
        self.index_subtree(key);
        self.roots.push(key);
        key
    }

    /// Create a node as the last child of `parent`
    pub fn spawn_child(&mut self, parent: NodeKey, name: impl Into<String>) -> Result<NodeKey, SceneError> {
        if !self.nodes.contains_key(parent) {
            warn!("spawn_child: parent node not found");
            return Err(SceneError::NodeNotFound);
        }
        let key = self.create_node(name);
        if let Err(err) = self.set_parent(key, Some(parent), false) {
            self.nodes.remove(key);
            return Err(err);
        }
        Ok(key)
    }

    /// Index `node` and every descendant already attached to it
    ///
    /// The node is appended to the root list if it has no parent.
    pub fn add_node(&mut self, node: NodeKey) -> Result<(), SceneError> {
        let Some(entry) = self.nodes.get(node) else {
            warn!("add_node: node not found");
            return Err(SceneError::NodeNotFound);
        };
        if entry.destroying {
            warn!("add_node: node {} is being destroyed", entry.id());
            return Err(SceneError::NodeDestroying(entry.id()));
        }

        let is_root = entry.parent.is_none();
        self.index_subtree(node);
        if is_root && !self.roots.contains(&node) {
            self.roots.push(node);
        }
        Ok(())
    }

    /// Remove `node` from the id index and root list without destroying it
    ///
    /// Descendants keep their index entries; tearing down a subtree is
    /// [`destroy`](Self::destroy)'s job.
    pub fn remove_node(&mut self, node: NodeKey) -> Result<(), SceneError> {
        let Some(entry) = self.nodes.get_mut(node) else {
            warn!("remove_node: node not found");
            return Err(SceneError::NodeNotFound);
        };
        entry.indexed = false;
        let id = entry.id();
        self.index.remove(&id);
        self.roots.retain(|&root| root != node);
        debug!("Removed node {} from scene '{}'", id, self.config.name);
        Ok(())
    }

    pub(crate) fn index_subtree(&mut self, node: NodeKey) {
        let mut stack = vec![node];
        while let Some(key) = stack.pop() {
            let Some(entry) = self.nodes.get_mut(key) else {
                continue;
            };
            entry.indexed = true;
            self.index.insert(entry.id(), key);
            stack.extend(entry.children.iter().copied());
        }
    }

    /// Drop `node` and its descendants from the id index
    pub(crate) fn unindex_subtree(&mut self, node: NodeKey) {
        let mut stack = vec![node];
        while let Some(key) = stack.pop() {
            let Some(entry) = self.nodes.get_mut(key) else {
                continue;
            };
            entry.indexed = false;
            self.index.remove(&entry.id());
            stack.extend(entry.children.iter().copied());
        }
    }

    // ── Lookup ─────────────────────────────────────────────────────────────

    /// Whether the handle resolves to a live node (indexed or not)
    pub fn contains(&self, node: NodeKey) -> bool {
        self.nodes.contains_key(node)
    }

    /// Borrow a node
    pub fn node(&self, node: NodeKey) -> Option<&Node> {
        self.nodes.get(node)
    }

    /// Mutably borrow a node (name, tag, active flag)
    pub fn node_mut(&mut self, node: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(node)
    }

    /// Resolve an id through the index
    pub fn find_by_id(&self, id: NodeId) -> Option<NodeKey> {
        self.index.get(&id).copied().filter(|&key| self.nodes.contains_key(key))
    }

    /// First indexed node with the given name, in id order
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.iter().find(|(_, node)| node.name() == name).map(|(key, _)| key)
    }

    /// Every indexed node with the given tag, in id order
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeKey> {
        self.iter()
            .filter(|(_, node)| node.tag() == tag)
            .map(|(key, _)| key)
            .collect()
    }

    /// Indexed nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node)> + '_ {
        self.index
            .values()
            .filter_map(move |&key| self.nodes.get(key).map(|node| (key, node)))
    }

    /// Root nodes in root-list order
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    /// Number of indexed nodes
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no node is indexed
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of live nodes in the arena, indexed or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Frames delivered through [`update`](Self::update)
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub(crate) fn bump_frame(&mut self) {
        self.frame += 1;
    }

    // ── Scene lifecycle ────────────────────────────────────────────────────

    /// Whether this scene is the one receiving updates
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Mark the scene active
    pub fn load(&mut self) -> Result<(), SceneError> {
        if self.loaded {
            warn!("Scene '{}' is already loaded", self.config.name);
            return Err(SceneError::AlreadyLoaded(self.config.name.clone()));
        }
        self.loaded = true;
        debug!("Loaded scene '{}'", self.config.name);
        Ok(())
    }

    /// Destroy every indexed node and mark the scene inactive
    pub fn unload(&mut self) -> Result<(), SceneError> {
        if !self.loaded {
            warn!("Scene '{}' is not loaded", self.config.name);
            return Err(SceneError::NotLoaded(self.config.name.clone()));
        }
        self.destroy_indexed();
        self.loaded = false;
        debug!("Unloaded scene '{}'", self.config.name);
        Ok(())
    }

    /// Destroy every indexed node, keeping the loaded flag
    pub fn clear(&mut self) {
        self.destroy_indexed();
        debug!("Cleared scene '{}'", self.config.name);
    }

    fn destroy_indexed(&mut self) {
        let keys: Vec<NodeKey> = self.index.values().copied().collect();
        for key in keys {
            if self.nodes.contains_key(key) {
                if let Err(err) = self.destroy(key) {
                    warn!("Failed to destroy node in scene '{}': {}", self.config.name, err);
                }
            }
        }
    }

    /// Per-frame entry point for the scheduler
    ///
    /// Negative delta times are clamped to zero and values above
    /// `max_frame_delta` are clamped down. Does nothing while unloaded.
    pub fn advance(&mut self, dt: f32) {
        if !self.loaded {
            trace!("Scene '{}' not loaded, skipping frame", self.config.name);
            return;
        }

        let mut dt = dt;
        if dt.is_nan() || dt < 0.0 {
            warn!("Scene '{}' received invalid delta time {}, using 0", self.config.name, dt);
            dt = 0.0;
        }
        let max = self.config.max_frame_delta;
        if max > 0.0 && dt > max {
            trace!("Clamping delta time {} to {}", dt, max);
            dt = max;
        }

        self.update(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_indexes_root() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("A");

        assert_eq!(scene.roots(), &[a]);
        assert_eq!(scene.len(), 1);
        let id = scene.node(a).map(Node::id).expect("node");
        assert_eq!(scene.find_by_id(id), Some(a));
    }

    #[test]
    fn test_created_node_is_not_indexed() {
        let mut scene = SceneGraph::new();
        let a = scene.create_node("A");
        assert!(scene.contains(a));
        assert!(scene.is_empty());
        assert!(scene.roots().is_empty());
        assert!(scene.find_by_name("A").is_none());
    }

    #[test]
    fn test_add_node_indexes_descendants() {
        let mut scene = SceneGraph::new();
        let parent = scene.create_node("P");
        let child = scene.create_node("C");
        scene.set_parent(child, Some(parent), false).expect("reparent");

        scene.add_node(parent).expect("add");

        assert_eq!(scene.roots(), &[parent]);
        assert_eq!(scene.find_by_name("C"), Some(child));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_add_node_twice_keeps_single_root_entry() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("A");
        scene.add_node(a).expect("add");
        assert_eq!(scene.roots(), &[a]);
    }

    #[test]
    fn test_remove_node_is_not_recursive() {
        let mut scene = SceneGraph::new();
        let parent = scene.spawn("P");
        let child = scene.spawn_child(parent, "C").expect("child");

        scene.remove_node(parent).expect("remove");

        assert!(scene.roots().is_empty());
        assert!(scene.find_by_name("P").is_none());
        assert_eq!(scene.find_by_name("C"), Some(child));
        assert!(scene.contains(parent));
    }

    #[test]
    fn test_find_by_name_and_tag() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("Enemy");
        let b = scene.spawn("Enemy");
        let c = scene.spawn("Player");
        for key in [a, b] {
            scene.node_mut(key).expect("node").set_tag("enemy");
        }

        assert_eq!(scene.find_by_name("Enemy"), Some(a));
        assert_eq!(scene.find_by_tag("enemy"), vec![a, b]);
        assert_eq!(scene.find_by_tag("untagged"), vec![c]);
        assert!(scene.find_by_tag("boss").is_empty());
    }

    #[test]
    fn test_default_tag_from_config() {
        let mut scene = SceneGraph::with_config(SceneConfig {
            default_tag: "prop".to_string(),
            ..SceneConfig::default()
        });
        let a = scene.spawn("A");
        assert_eq!(scene.node(a).map(Node::tag), Some("prop"));
    }

    #[test]
    fn test_load_unload_state_machine() {
        let mut scene = SceneGraph::new();
        assert!(!scene.is_loaded());
        assert!(matches!(scene.unload(), Err(SceneError::NotLoaded(_))));

        scene.load().expect("load");
        assert!(scene.is_loaded());
        assert!(matches!(scene.load(), Err(SceneError::AlreadyLoaded(_))));

        let a = scene.spawn("A");
        scene.unload().expect("unload");
        assert!(!scene.is_loaded());
        assert!(!scene.contains(a));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_clear_keeps_loaded_flag() {
        let mut scene = SceneGraph::new();
        scene.load().expect("load");
        let parent = scene.spawn("P");
        scene.spawn_child(parent, "C").expect("child");

        scene.clear();

        assert!(scene.is_loaded());
        assert!(scene.is_empty());
        assert!(scene.roots().is_empty());
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_advance_requires_loaded_scene() {
        let mut scene = SceneGraph::new();
        scene.advance(0.016);
        assert_eq!(scene.frame_count(), 0);

        scene.load().expect("load");
        scene.advance(0.016);
        scene.advance(-1.0);
        assert_eq!(scene.frame_count(), 2);
    }
}
