//! Handle and identifier types for scene storage
//!
//! Nodes are stored in a [`SlotMap`] arena. The generational [`NodeKey`] is
//! the handle every API takes; a key whose node was destroyed simply stops
//! resolving, which is what makes it usable as a non-owning parent link.
//!
//! [`NodeId`] and [`ComponentId`] are process-unique serial numbers handed
//! out by process-wide counters. They increase monotonically and are never
//! reused, even across scenes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generational handle to a node stored in a scene graph arena.
    pub struct NodeKey;
}

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, process-unique node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate the next node id
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one attached component instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Allocate the next component id
    pub(crate) fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn value(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_are_monotonic() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_component_ids_are_unique() {
        let ids: Vec<_> = (0..16).map(|_| ComponentId::next()).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }
}
