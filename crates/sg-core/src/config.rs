//! Node-type classification configuration.
//!
//! Mirrors the `node_types_config.json` shape consumed by the script graph:
//! an ordered rule list, a default tag and ordered ignore patterns. Fields
//! missing from a JSON document fall back to the built-in values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One `(pattern, tag)` classification rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NodeTypeDefinition {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub description: String,
}

impl NodeTypeDefinition {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NodeTypeConfig {
    /// Evaluated in order; the first matching pattern wins.
    pub node_types: Vec<NodeTypeDefinition>,
    pub default_node_type: String,
    pub ignore_patterns: Vec<String>,
}

impl Default for NodeTypeConfig {
    fn default() -> Self {
        Self {
            node_types: vec![
                NodeTypeDefinition::new("start", "^START", "Start of a dialogue or section"),
                NodeTypeDefinition::new("end", "^END", "End of a dialogue or section"),
                NodeTypeDefinition::new("function", r"^\s*function\s+", "Function definition"),
                NodeTypeDefinition::new("function_call", r"^\s*call\s+", "Function call"),
                NodeTypeDefinition::new("jump", r"^\s*jump\s+to\s+", "Jump to another section"),
                NodeTypeDefinition::new("wait", r"^\s*wait\s+", "Wait/pause in the dialogue"),
                NodeTypeDefinition::new("show", r"^\s*show\s+", "Show character or background"),
            ],
            default_node_type: "dialogue".to_string(),
            ignore_patterns: vec![r"^\s*name\s*:".to_string(), r"^\s*$".to_string()],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid node type configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl NodeTypeConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Configured tag names in rule order, followed by the default tag when
    /// no rule carries it.
    #[must_use]
    pub fn node_type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .node_types
            .iter()
            .map(|definition| definition.name.as_str())
            .collect();
        if !names.contains(&self.default_node_type.as_str()) {
            names.push(self.default_node_type.as_str());
        }
        names
    }
}
