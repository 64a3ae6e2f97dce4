//! Scene Manager - owns named scenes and switches the active one
//!
//! At most one scene is loaded at a time. Activating a scene unloads the
//! previous one (destroying its nodes) before loading the new one.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::scene::{SceneError, SceneGraph};

/// Collection of named scenes with a single active scene
#[derive(Debug, Default)]
pub struct SceneManager {
    /// Scenes by name
    scenes: HashMap<String, SceneGraph>,

    /// Name of the loaded scene
    active: Option<String>,
}

impl SceneManager {
    /// Create an empty scene manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene under its configured name
    ///
    /// Returns the scene previously registered under that name. If it was
    /// the active scene it is unloaded first and nothing is active anymore.
    pub fn add_scene(&mut self, scene: SceneGraph) -> Option<SceneGraph> {
        let name = scene.name().to_string();
        debug!("Registered scene '{}'", name);
        let mut previous = self.scenes.insert(name.clone(), scene)?;
        warn!("Scene '{}' replaced an existing scene of the same name", name);
        if self.active.as_deref() == Some(name.as_str()) {
            self.active = None;
            if previous.is_loaded() {
                if let Err(err) = previous.unload() {
                    warn!("Failed to unload replaced scene '{}': {}", name, err);
                }
            }
        }
        Some(previous)
    }

    /// Unregister a scene, unloading it if it is active
    pub fn remove_scene(&mut self, name: &str) -> Option<SceneGraph> {
        let mut scene = self.scenes.remove(name)?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
            if scene.is_loaded() {
                if let Err(err) = scene.unload() {
                    warn!("Failed to unload removed scene '{}': {}", name, err);
                }
            }
        }
        debug!("Removed scene '{}'", name);
        Some(scene)
    }

    /// Make `name` the loaded scene
    pub fn activate(&mut self, name: &str) -> Result<(), SceneError> {
        if !self.scenes.contains_key(name) {
            warn!("Cannot activate unknown scene '{}'", name);
            return Err(SceneError::SceneNotFound(name.to_string()));
        }
        if self.active.as_deref() == Some(name) {
            debug!("Scene '{}' is already active", name);
            return Ok(());
        }

        if let Some(previous) = self.active.take() {
            if let Some(scene) = self.scenes.get_mut(&previous) {
                if scene.is_loaded() {
                    scene.unload()?;
                }
            }
        }

        if let Some(scene) = self.scenes.get_mut(name) {
            if !scene.is_loaded() {
                scene.load()?;
            }
        }
        self.active = Some(name.to_string());
        info!("Activated scene '{}'", name);
        Ok(())
    }

    /// Name of the active scene
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active scene
    pub fn active(&self) -> Option<&SceneGraph> {
        self.active.as_ref().and_then(|name| self.scenes.get(name))
    }

    /// The active scene, mutably
    pub fn active_mut(&mut self) -> Option<&mut SceneGraph> {
        let name = self.active.as_ref()?;
        self.scenes.get_mut(name)
    }

    /// A registered scene by name
    pub fn scene(&self, name: &str) -> Option<&SceneGraph> {
        self.scenes.get(name)
    }

    /// A registered scene by name, mutably
    pub fn scene_mut(&mut self, name: &str) -> Option<&mut SceneGraph> {
        self.scenes.get_mut(name)
    }

    /// Number of registered scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether no scene is registered
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Advance the active scene by one frame
    pub fn advance(&mut self, dt: f32) {
        if let Some(scene) = self.active_mut() {
            scene.advance(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn scene(name: &str) -> SceneGraph {
        let mut scene = SceneGraph::with_config(SceneConfig::named(name));
        scene.spawn("Camera");
        scene
    }

    #[test]
    fn test_activate_loads_scene() {
        let mut manager = SceneManager::new();
        manager.add_scene(scene("Menu"));

        manager.activate("Menu").expect("activate");

        assert_eq!(manager.active_name(), Some("Menu"));
        assert!(manager.active().is_some_and(SceneGraph::is_loaded));
    }

    #[test]
    fn test_switching_unloads_previous() {
        let mut manager = SceneManager::new();
        manager.add_scene(scene("Menu"));
        manager.add_scene(scene("Level"));
        manager.activate("Menu").expect("activate");

        manager.activate("Level").expect("activate");

        let menu = manager.scene("Menu").expect("menu");
        assert!(!menu.is_loaded());
        assert!(menu.is_empty());
        assert!(manager.scene("Level").is_some_and(SceneGraph::is_loaded));
    }

    #[test]
    fn test_unknown_scene_is_rejected() {
        let mut manager = SceneManager::new();
        assert!(matches!(manager.activate("Nowhere"), Err(SceneError::SceneNotFound(_))));
        assert!(manager.active().is_none());
    }

    #[test]
    fn test_advance_only_reaches_active_scene() {
        let mut manager = SceneManager::new();
        manager.add_scene(scene("Menu"));
        manager.add_scene(scene("Level"));
        manager.activate("Level").expect("activate");

        manager.advance(0.016);

        assert_eq!(manager.scene("Level").map(SceneGraph::frame_count), Some(1));
        assert_eq!(manager.scene("Menu").map(SceneGraph::frame_count), Some(0));
    }

    #[test]
    fn test_remove_active_scene_unloads_it() {
        let mut manager = SceneManager::new();
        manager.add_scene(scene("Level"));
        manager.activate("Level").expect("activate");

        let removed = manager.remove_scene("Level").expect("removed");

        assert!(!removed.is_loaded());
        assert!(manager.active().is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_replacing_active_scene_unloads_it() {
        let mut manager = SceneManager::new();
        manager.add_scene(scene("Level"));
        manager.activate("Level").expect("activate");

        let previous = manager.add_scene(scene("Level")).expect("replaced");

        assert!(!previous.is_loaded());
        assert!(previous.is_empty());
        assert!(manager.active().is_none());
        assert!(manager.scene("Level").is_some_and(|scene| !scene.is_loaded()));
    }
}
