//! Parent/child structure: reparenting, sibling order, ancestry queries
//!
//! Acyclicity is enforced procedurally: `set_parent` walks the requested
//! parent's ancestor chain and refuses any move that would make a node its
//! own ancestor.

use log::{debug, trace, warn};

use crate::foundation::collections::NodeKey;
use crate::foundation::math::{decompose_trs, try_inverse, Mat4};
use crate::scene::{SceneError, SceneGraph};

impl SceneGraph {
    /// Parent of `node`, `None` for roots and unknown handles
    pub fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.nodes.get(node)?.parent
    }

    /// Children of `node` in sibling order
    pub fn children(&self, node: NodeKey) -> &[NodeKey] {
        self.nodes.get(node).map_or(&[], |entry| entry.children.as_slice())
    }

    /// Whether `ancestor` appears on `other`'s parent chain
    pub fn is_ancestor_of(&self, ancestor: NodeKey, other: NodeKey) -> bool {
        let mut current = self.parent(other);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }
        false
    }

    /// `node` and all its descendants, depth-first pre-order
    pub fn subtree(&self, node: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(key) = stack.pop() {
            let Some(entry) = self.nodes.get(key) else {
                continue;
            };
            out.push(key);
            stack.extend(entry.children.iter().rev().copied());
        }
        out
    }

    /// Number of ancestors above `node`
    pub fn depth(&self, node: NodeKey) -> usize {
        let mut depth = 0;
        let mut current = self.parent(node);
        while let Some(key) = current {
            depth += 1;
            current = self.parent(key);
        }
        depth
    }

    /// Whether `node` and every ancestor have their active flag set
    pub fn active_in_hierarchy(&self, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            match self.nodes.get(key) {
                Some(entry) if entry.is_active() => current = entry.parent,
                _ => return false,
            }
        }
        true
    }

    /// Move `node` under `new_parent` (or to the root list for `None`)
    ///
    /// The node is appended as the last child. With `preserve_world` the
    /// node's world pose is kept by rewriting its local pose in the new
    /// parent's space; otherwise the local pose is kept and the world pose
    /// follows the new parent. Rejects self-parenting and cycles.
    pub fn set_parent(
        &mut self,
        node: NodeKey,
        new_parent: Option<NodeKey>,
        preserve_world: bool,
    ) -> Result<(), SceneError> {
        let Some(entry) = self.nodes.get(node) else {
            warn!("set_parent: node not found");
            return Err(SceneError::NodeNotFound);
        };
        let node_id = entry.id();
        if entry.destroying {
            warn!("set_parent: node {} is being destroyed", node_id);
            return Err(SceneError::NodeDestroying(node_id));
        }

        if let Some(parent) = new_parent {
            let Some(parent_entry) = self.nodes.get(parent) else {
                warn!("set_parent: new parent of node {} not found", node_id);
                return Err(SceneError::NodeNotFound);
            };
            let parent_id = parent_entry.id();
            if parent == node {
                warn!("Node {} cannot be parented to itself", node_id);
                return Err(SceneError::SelfParent(node_id));
            }
            if self.is_ancestor_of(node, parent) {
                warn!("Cannot parent node {} under its descendant {}", node_id, parent_id);
                return Err(SceneError::CycleDetected { node: node_id, new_parent: parent_id });
            }
            if parent_entry.destroying {
                warn!("set_parent: new parent {} is being destroyed", parent_id);
                return Err(SceneError::NodeDestroying(parent_id));
            }
        }

        let world_snapshot = if preserve_world { self.world_matrix(node) } else { None };

        // Unlink from the old owner list.
        let old_parent = self.nodes.get(node).and_then(|entry| entry.parent);
        match old_parent {
            Some(old) => {
                if let Some(old_entry) = self.nodes.get_mut(old) {
                    old_entry.children.retain(|&child| child != node);
                }
            }
            None => self.roots.retain(|&root| root != node),
        }

        // Link into the new owner list.
        match new_parent {
            Some(parent) => {
                let parent_indexed = self.nodes.get_mut(parent).map_or(false, |parent_entry| {
                    parent_entry.children.push(node);
                    parent_entry.indexed
                });
                let mut was_indexed = false;
                if let Some(entry) = self.nodes.get_mut(node) {
                    entry.parent = Some(parent);
                    was_indexed = entry.indexed;
                }
                if parent_indexed && !was_indexed {
                    self.index_subtree(node);
                } else if !parent_indexed && was_indexed {
                    debug!("Node {} moved under an unindexed parent, leaving the scene index", node_id);
                    self.unindex_subtree(node);
                }
            }
            None => {
                if let Some(entry) = self.nodes.get_mut(node) {
                    entry.parent = None;
                    if entry.indexed {
                        self.roots.push(node);
                    }
                }
            }
        }

        if let Some(world) = world_snapshot {
            let local = match new_parent {
                Some(parent) => {
                    let parent_world = self.world_matrix(parent).unwrap_or_else(Mat4::identity);
                    try_inverse(&parent_world, self.config.singular_epsilon).map(|inverse| inverse * world)
                }
                None => Some(world),
            };
            match local {
                Some(local) => {
                    let (position, rotation, scale) = decompose_trs(&local);
                    if let Some(entry) = self.nodes.get_mut(node) {
                        entry.transform.set_local(position, rotation, scale);
                    }
                }
                None => warn!(
                    "New parent of node {} has a singular world matrix; keeping local pose",
                    node_id
                ),
            }
        }

        self.mark_subtree_dirty(node);
        trace!("Reparented node {}", node_id);
        Ok(())
    }

    /// Attach `child` as the last child of `parent`, keeping its local pose
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        self.set_parent(child, Some(parent), false)
    }

    /// Detach `child` from `parent` into the root list, keeping its local pose
    ///
    /// No-op if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        if self.parent(child) != Some(parent) {
            trace!("remove_child: not a child of the given parent");
            return Ok(());
        }
        self.set_parent(child, None, false)
    }

    /// Position of `node` within its parent's children or the root list
    pub fn sibling_index(&self, node: NodeKey) -> Option<usize> {
        let siblings = match self.nodes.get(node)?.parent {
            Some(parent) => self.nodes.get(parent)?.children.as_slice(),
            None => self.roots.as_slice(),
        };
        siblings.iter().position(|&key| key == node)
    }

    /// Move `node` to `index` within its owning list
    ///
    /// The index is clamped to the list bounds, so an oversized index moves
    /// the node to the end. Other siblings keep their relative order.
    pub fn set_sibling_index(&mut self, node: NodeKey, index: usize) -> Result<(), SceneError> {
        let Some(parent) = self.nodes.get(node).map(|entry| entry.parent) else {
            warn!("set_sibling_index: node not found");
            return Err(SceneError::NodeNotFound);
        };

        let siblings = match parent {
            Some(parent) => match self.nodes.get_mut(parent) {
                Some(parent_entry) => &mut parent_entry.children,
                None => return Err(SceneError::NodeNotFound),
            },
            None => &mut self.roots,
        };

        let Some(current) = siblings.iter().position(|&key| key == node) else {
            trace!("set_sibling_index: node is not in any owning list");
            return Ok(());
        };
        siblings.remove(current);
        let index = index.min(siblings.len());
        siblings.insert(index, node);
        Ok(())
    }
}
