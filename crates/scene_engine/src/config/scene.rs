//! Scene graph configuration

use serde::{Deserialize, Serialize};

use super::Config;

/// Tunables for a [`SceneGraph`](crate::scene::SceneGraph)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene name, used in logs and by the serializer
    pub name: String,

    /// Tag given to freshly created nodes
    pub default_tag: String,

    /// Determinant magnitude at or below which a world matrix is treated
    /// as singular and not inverted
    pub singular_epsilon: f32,

    /// Largest delta time (seconds) accepted by `advance`; 0 disables clamping
    pub max_frame_delta: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            default_tag: "untagged".to_string(),
            singular_epsilon: 1e-6,
            max_frame_delta: 0.25,
        }
    }
}

impl SceneConfig {
    /// Default configuration with a custom scene name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.default_tag, "untagged");
        assert!(config.singular_epsilon > 0.0);
    }

    #[test]
    fn test_parse_toml_with_missing_fields() {
        let config = SceneConfig::parse("scene.toml", "name = \"Level 1\"\nmax_frame_delta = 0.1\n")
            .expect("valid toml");
        assert_eq!(config.name, "Level 1");
        assert!((config.max_frame_delta - 0.1).abs() < 1e-6);
        assert_eq!(config.default_tag, "untagged");
    }

    #[test]
    fn test_parse_ron() {
        let config = SceneConfig::parse("scene.ron", "(name: \"Menu\", default_tag: \"ui\")")
            .expect("valid ron");
        assert_eq!(config.name, "Menu");
        assert_eq!(config.default_tag, "ui");
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SceneConfig::parse("scene.yaml", "");
        assert!(matches!(result, Err(crate::config::ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!("scene_config_{}.toml", std::process::id()));
        let config = SceneConfig::named("Roundtrip");
        config.save_to_file(&path).expect("save");
        let loaded = SceneConfig::load_from_file(&path).expect("load");
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
