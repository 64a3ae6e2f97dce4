//! Per-frame visual collection
//!
//! Walks the active hierarchy depth-first in sibling order and hands every
//! visible [`MeshRenderer`] to the renderer with its node's world matrix.

use log::trace;

use crate::foundation::collections::NodeKey;
use crate::foundation::math::Mat4;
use crate::render::Renderer;
use crate::scene::components::MeshRenderer;
use crate::scene::SceneGraph;

impl SceneGraph {
    /// Push this frame's visuals to `renderer`
    ///
    /// Visuals queued for release by detached renderables are released
    /// first. Renderables are bound on their first sync. Returns the number
    /// of submitted draws.
    pub fn sync_visuals(&mut self, renderer: &mut dyn Renderer) -> usize {
        for handle in self.released_visuals.drain(..) {
            renderer.release(handle);
        }

        let mut stack: Vec<NodeKey> = self
            .roots
            .iter()
            .rev()
            .copied()
            .filter(|&root| self.nodes.get(root).is_some_and(|entry| entry.indexed && entry.parent.is_none()))
            .collect();
        let mut submitted = 0;

        while let Some(node) = stack.pop() {
            let Some(entry) = self.nodes.get(node) else {
                continue;
            };
            if !entry.is_active() || entry.destroy_pending {
                continue;
            }
            let id = entry.id();
            let children: Vec<NodeKey> = entry.children.iter().rev().copied().collect();
            let renders = entry
                .components
                .iter()
                .any(|slot| slot.is::<MeshRenderer>() && slot.enabled && !slot.detaching);

            if renders {
                let world = self.world_matrix(node).unwrap_or_else(Mat4::identity);
                if let Some(entry) = self.nodes.get_mut(node) {
                    for slot in entry
                        .components
                        .iter_mut()
                        .filter(|slot| slot.enabled && !slot.detaching)
                    {
                        let Some(mesh) = slot.downcast_mut::<MeshRenderer>() else {
                            continue;
                        };
                        if !mesh.visible {
                            continue;
                        }
                        let handle = match mesh.visual {
                            Some(handle) => handle,
                            None => {
                                let handle = renderer.bind(&mesh.desc(id));
                                mesh.visual = Some(handle);
                                handle
                            }
                        };
                        renderer.submit(handle, &world);
                        submitted += 1;
                    }
                }
            }

            stack.extend(children);
        }

        trace!("Synced {} visuals for scene '{}'", submitted, self.config.name);
        submitted
    }
}
