use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use sg_core::{NodeType, NodeTypeConfig};
use thiserror::Error;

static BUILTIN: LazyLock<LineClassifier> = LazyLock::new(|| {
    LineClassifier::from_config(&NodeTypeConfig::default())
        .expect("built-in node type patterns must compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Matched an ignore pattern; produces no node.
    Ignored,
    Node(NodeType),
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("invalid {kind} pattern '{pattern}': {source}")]
    InvalidPattern {
        kind: PatternKind,
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Ignore,
    /// Rule pattern for the named node type tag.
    Rule,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ignore => "ignore",
            Self::Rule => "node type",
        })
    }
}

/// Compiled, read-only form of a [`NodeTypeConfig`].
///
/// Patterns are case-insensitive and only match at the start of a line.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    ignore: Vec<Regex>,
    rules: Vec<(Regex, NodeType)>,
    default_type: NodeType,
}

impl LineClassifier {
    pub fn from_config(config: &NodeTypeConfig) -> Result<Self, ClassifierError> {
        let ignore = config
            .ignore_patterns
            .iter()
            .map(|pattern| compile_anchored(pattern, PatternKind::Ignore))
            .collect::<Result<Vec<_>, _>>()?;

        let rules = config
            .node_types
            .iter()
            .map(|definition| {
                compile_anchored(&definition.pattern, PatternKind::Rule)
                    .map(|regex| (regex, NodeType::from_tag(&definition.name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ignore,
            rules,
            default_type: NodeType::from_tag(&config.default_node_type),
        })
    }

    /// Classifier for [`NodeTypeConfig::default`], compiled once.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    #[must_use]
    pub fn classify(&self, line: &str) -> Classification {
        if self.ignore.iter().any(|pattern| pattern.is_match(line)) {
            return Classification::Ignored;
        }

        let node_type = self
            .rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(line))
            .map_or_else(|| self.default_type.clone(), |(_, tag)| tag.clone());
        Classification::Node(node_type)
    }

    #[must_use]
    pub fn default_type(&self) -> &NodeType {
        &self.default_type
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

fn compile_anchored(pattern: &str, kind: PatternKind) -> Result<Regex, ClassifierError> {
    RegexBuilder::new(&format!("^(?:{pattern})"))
        .case_insensitive(true)
        .build()
        .map_err(|source| ClassifierError::InvalidPattern {
            kind,
            pattern: pattern.to_string(),
            source,
        })
}
