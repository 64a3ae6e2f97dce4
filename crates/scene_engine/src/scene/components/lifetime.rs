//! Lifetime Component
//!
//! Counts down and destroys its node when the time is up.

use log::{debug, warn};

use crate::impl_component_any;
use crate::scene::serializer::ComponentData;
use crate::scene::{Component, NodeContext};

/// Destroys its node after `duration` seconds of updates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    /// How long the node should live (in seconds, 0 = forever)
    pub duration: f32,
    /// Time accumulated so far (in seconds)
    pub elapsed: f32,
}

impl Lifetime {
    /// Create a new lifetime component
    pub fn new(duration: f32) -> Self {
        Self { duration, elapsed: 0.0 }
    }

    /// Check if the lifetime has run out
    pub fn is_expired(&self) -> bool {
        if self.duration <= 0.0 {
            false // Infinite lifetime
        } else {
            self.elapsed >= self.duration
        }
    }

    /// Get remaining lifetime in seconds
    pub fn remaining(&self) -> f32 {
        if self.duration <= 0.0 {
            f32::INFINITY
        } else {
            (self.duration - self.elapsed).max(0.0)
        }
    }
}

impl Component for Lifetime {
    fn type_name(&self) -> &'static str {
        "lifetime"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_>, dt: f32) {
        self.elapsed += dt;
        if self.is_expired() {
            if let Some(id) = ctx.node_id() {
                debug!("Lifetime of node {} expired after {:.2}s", id, self.elapsed);
            }
            if let Err(err) = ctx.destroy_node() {
                warn!("Lifetime could not destroy its node: {}", err);
            }
        }
    }

    fn to_data(&self) -> Option<ComponentData> {
        Some(ComponentData::Lifetime {
            duration: self.duration,
            elapsed: self.elapsed,
        })
    }

    impl_component_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;

    #[test]
    fn test_lifetime_not_expired() {
        let lifetime = Lifetime { duration: 5.0, elapsed: 2.0 };
        assert!(!lifetime.is_expired());
        assert_eq!(lifetime.remaining(), 3.0);
    }

    #[test]
    fn test_infinite_lifetime() {
        let lifetime = Lifetime { duration: 0.0, elapsed: 1000.0 };
        assert!(!lifetime.is_expired());
        assert_eq!(lifetime.remaining(), f32::INFINITY);
    }

    #[test]
    fn test_node_destroyed_when_expired() {
        let mut scene = SceneGraph::new();
        let node = scene.spawn("Bullet");
        let child = scene.spawn_child(node, "Trail").expect("child");
        scene.add_component(node, Lifetime::new(1.0)).expect("add");

        scene.update(0.5);
        assert!(scene.contains(node));

        scene.update(0.5);
        assert!(!scene.contains(node));
        assert!(!scene.contains(child));
        assert!(scene.is_empty());
    }
}
