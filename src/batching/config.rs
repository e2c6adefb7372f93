use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Split each material into meshes of roughly this many vertices.
    pub vertex_budget: Option<usize>,
    /// Fail instead of skipping colliders that can't be batched.
    pub strict_collider_shapes: bool,
    pub collider_anchor_name: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            vertex_budget: None,
            strict_collider_shapes: false,
            collider_anchor_name: "Colliders".to_string(),
        }
    }
}

impl BatchConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid batch config {}", path.display()))
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_fields_use_defaults() {
        let config = BatchConfig::from_json(r#"{"vertex_budget": 150}"#).unwrap();

        assert_eq!(
            config,
            BatchConfig {
                vertex_budget: Some(150),
                ..BatchConfig::default()
            }
        );
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(BatchConfig::from_json("{}").unwrap(), BatchConfig::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(BatchConfig::from_json_file("does/not/exist.json").is_err());
    }
}
