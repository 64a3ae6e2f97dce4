//! In-memory renderer that records every call

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::foundation::math::Mat4;
use crate::render::{Renderer, VisualDesc, VisualHandle};

/// One submitted draw
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Visual that was drawn
    pub handle: VisualHandle,
    /// World matrix it was drawn with
    pub world: Mat4,
}

/// Renderer that keeps bound visuals and submissions in memory
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_handle: u64,
    bound: BTreeMap<VisualHandle, VisualDesc>,
    submissions: Vec<Submission>,
    released: Vec<VisualHandle>,
}

impl RecordingRenderer {
    /// Create an empty renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently bound visuals
    pub fn bound(&self) -> impl Iterator<Item = (&VisualHandle, &VisualDesc)> {
        self.bound.iter()
    }

    /// Number of currently bound visuals
    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    /// Description of a bound visual
    pub fn desc(&self, handle: VisualHandle) -> Option<&VisualDesc> {
        self.bound.get(&handle)
    }

    /// Draws recorded since the last [`begin_frame`](Self::begin_frame)
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Every handle released so far
    pub fn released(&self) -> &[VisualHandle] {
        &self.released
    }

    /// Forget the previous frame's submissions
    pub fn begin_frame(&mut self) {
        self.submissions.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn bind(&mut self, desc: &VisualDesc) -> VisualHandle {
        self.next_handle += 1;
        let handle = VisualHandle(self.next_handle);
        debug!("Bound visual {:?} ({} / {}) for node {}", handle, desc.mesh, desc.material, desc.node);
        self.bound.insert(handle, desc.clone());
        handle
    }

    fn submit(&mut self, handle: VisualHandle, world: &Mat4) {
        if !self.bound.contains_key(&handle) {
            warn!("Submit of unbound visual {:?}", handle);
            return;
        }
        self.submissions.push(Submission { handle, world: *world });
    }

    fn release(&mut self, handle: VisualHandle) {
        if self.bound.remove(&handle).is_none() {
            warn!("Release of unbound visual {:?}", handle);
            return;
        }
        debug!("Released visual {:?}", handle);
        self.released.push(handle);
    }
}
