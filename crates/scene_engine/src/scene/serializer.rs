//! Scene persistence
//!
//! Converts node trees to plain serde data and back. The data is format
//! agnostic; JSON and RON text helpers are provided.
//!
//! ```text
//! { name, tag, active,
//!   transform: { position: {x,y,z}, rotation: {x,y,z} (radians), scale: {x,y,z} },
//!   components: [ { type, ...fields } ],
//!   children: [ ... ] }
//! ```
//!
//! Deserialization rebuilds nodes top-down: each node is created, attached
//! (as a root or under its already rebuilt parent, keeping its local pose),
//! given its transform and then its components, before its children.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::foundation::collections::NodeKey;
use crate::foundation::math::Vec3;
use crate::scene::component::ComponentSlot;
use crate::scene::{components, SceneError, SceneGraph};

/// Serialized 3-vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3Data {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl From<Vec3> for Vec3Data {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vec3Data> for Vec3 {
    fn from(v: Vec3Data) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// Serialized local pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    /// Local position
    pub position: Vec3Data,
    /// Local Euler angles in radians
    pub rotation: Vec3Data,
    /// Local scale
    pub scale: Vec3Data,
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            position: Vec3Data::default(),
            rotation: Vec3Data::default(),
            scale: Vec3Data { x: 1.0, y: 1.0, z: 1.0 },
        }
    }
}

/// Serialized component, tagged by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ComponentData {
    /// [`Rotator`](crate::scene::components::Rotator)
    Rotator {
        speed: Vec3Data,
    },
    /// [`Mover`](crate::scene::components::Mover)
    Mover {
        velocity: Vec3Data,
        #[serde(default)]
        world_space: bool,
    },
    /// [`Lifetime`](crate::scene::components::Lifetime)
    Lifetime {
        duration: f32,
        #[serde(default)]
        elapsed: f32,
    },
    /// [`MeshRenderer`](crate::scene::components::MeshRenderer)
    MeshRenderer {
        mesh: String,
        material: String,
        #[serde(default = "visible_by_default")]
        visible: bool,
    },
    /// Any type tag this build does not know; skipped on load
    #[serde(other)]
    Unknown,
}

fn visible_by_default() -> bool {
    true
}

/// Serialized node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Node name
    pub name: String,
    /// Classification tag
    #[serde(default = "untagged")]
    pub tag: String,
    /// Own active flag
    #[serde(default = "active_by_default")]
    pub active: bool,
    /// Local pose
    #[serde(default)]
    pub transform: TransformData,
    /// Components after the transform, in attachment order
    #[serde(default)]
    pub components: Vec<ComponentData>,
    /// Children in sibling order
    #[serde(default)]
    pub children: Vec<NodeData>,
}

fn untagged() -> String {
    "untagged".to_string()
}

fn active_by_default() -> bool {
    true
}

/// Serialized scene: its name and root nodes in root order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    /// Scene name
    pub name: String,
    /// Root nodes
    #[serde(default)]
    pub nodes: Vec<NodeData>,
}

/// Tree <-> data translation
pub struct SceneSerializer;

impl SceneSerializer {
    /// Snapshot `node` and its subtree
    ///
    /// Components without a serialized form are left out. A component whose
    /// hook is running is written as it was when that hook started.
    pub fn serialize_node(scene: &SceneGraph, node: NodeKey) -> Option<NodeData> {
        let entry = scene.node(node)?;
        let transform = entry.transform();
        let components = entry
            .components
            .iter()
            .filter(|slot| !slot.detaching)
            .filter_map(ComponentSlot::to_data)
            .collect();
        let children = entry
            .children()
            .iter()
            .filter_map(|&child| Self::serialize_node(scene, child))
            .collect();

        Some(NodeData {
            name: entry.name().to_string(),
            tag: entry.tag().to_string(),
            active: entry.is_active(),
            transform: TransformData {
                position: transform.local_position().into(),
                rotation: transform.local_rotation().into(),
                scale: transform.local_scale().into(),
            },
            components,
            children,
        })
    }

    /// Snapshot every root of `scene`, in root order
    pub fn serialize_scene(scene: &SceneGraph) -> SceneData {
        SceneData {
            name: scene.name().to_string(),
            nodes: scene
                .roots()
                .iter()
                .filter_map(|&root| Self::serialize_node(scene, root))
                .collect(),
        }
    }

    /// Rebuild `data` inside `scene`, under `parent` or as a new root
    pub fn deserialize_node(scene: &mut SceneGraph, data: &NodeData, parent: Option<NodeKey>) -> Result<NodeKey, SceneError> {
        let node = scene.create_node(data.name.clone());
        let attached = match parent {
            Some(parent) => scene.set_parent(node, Some(parent), false),
            None => scene.add_node(node),
        };
        if let Err(err) = attached {
            scene.nodes.remove(node);
            return Err(err);
        }

        if let Some(entry) = scene.node_mut(node) {
            entry.set_tag(data.tag.clone());
            entry.set_active(data.active);
        }
        scene.set_local(
            node,
            data.transform.position.into(),
            data.transform.rotation.into(),
            data.transform.scale.into(),
        )?;

        for component in &data.components {
            if let Some(component) = components::from_data(component) {
                scene.add_boxed_component(node, component)?;
            }
        }

        for child in &data.children {
            Self::deserialize_node(scene, child, Some(node))?;
        }
        Ok(node)
    }

    /// Rebuild every root of `data` inside `scene`, returning the new roots
    pub fn deserialize_into(scene: &mut SceneGraph, data: &SceneData) -> Result<Vec<NodeKey>, SceneError> {
        let roots = data
            .nodes
            .iter()
            .map(|node| Self::deserialize_node(scene, node, None))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Deserialized {} root nodes into scene '{}'", roots.len(), scene.name());
        Ok(roots)
    }

    /// Build a new, unloaded scene named after `data`
    pub fn deserialize_scene(data: &SceneData) -> Result<SceneGraph, SceneError> {
        let mut scene = SceneGraph::with_config(SceneConfig::named(data.name.clone()));
        Self::deserialize_into(&mut scene, data)?;
        Ok(scene)
    }

    /// Pretty-printed JSON
    pub fn to_json(data: &SceneData) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Parse JSON scene data
    pub fn from_json(text: &str) -> Result<SceneData, SceneError> {
        serde_json::from_str(text).map_err(|err| {
            warn!("Failed to parse scene JSON: {}", err);
            SceneError::from(err)
        })
    }

    /// Pretty-printed RON
    pub fn to_ron(data: &SceneData) -> Result<String, SceneError> {
        Ok(ron::ser::to_string_pretty(data, ron::ser::PrettyConfig::default())?)
    }

    /// Parse RON scene data
    pub fn from_ron(text: &str) -> Result<SceneData, SceneError> {
        ron::from_str(text).map_err(|err| {
            warn!("Failed to parse scene RON: {}", err);
            SceneError::from(err)
        })
    }
}

impl SceneGraph {
    /// Clone the subtree at `node` as a new root with fresh ids
    pub fn instantiate(&mut self, node: NodeKey) -> Result<NodeKey, SceneError> {
        let Some(data) = SceneSerializer::serialize_node(self, node) else {
            warn!("instantiate: node not found");
            return Err(SceneError::NodeNotFound);
        };
        SceneSerializer::deserialize_node(self, &data, None)
    }
}
