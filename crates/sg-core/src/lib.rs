#![forbid(unsafe_code)]

//! Core graph model for SNIL dialogue scripts.
//!
//! A parsed document is a list of independent [`SectionGraph`]s. Each section
//! holds its statement nodes in construction order and the edges between
//! them. Node ids are section-scoped: every section starts again at `n_0`.

mod config;

pub use config::{ConfigError, NodeTypeConfig, NodeTypeDefinition};

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Tag used for nodes produced by conditional blocks.
pub const CONDITION_TAG: &str = "condition";

/// Legacy tag that classifies as [`NodeType::Function`].
pub const FUNCTION_CALL_ALIAS: &str = "function_call";

/// Section-scoped node identifier, rendered as `n_<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid node id '{0}' (expected 'n_<index>')")]
pub struct NodeIdParseError(pub String);

impl FromStr for NodeId {
    type Err = NodeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("n_")
            .and_then(|digits| digits.parse::<usize>().ok())
            .map(Self)
            .ok_or_else(|| NodeIdParseError(s.to_string()))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Statement type of a node.
///
/// The well-known tags of the built-in configuration get their own variant so
/// renderers can match on them; any other configured tag is carried in
/// [`NodeType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NodeType {
    Start,
    End,
    #[default]
    Dialogue,
    Function,
    Jump,
    Wait,
    Show,
    Condition,
    Other(String),
}

impl NodeType {
    /// Resolve a configured tag name. `function_call` folds into `Function`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "start" => Self::Start,
            "end" => Self::End,
            "dialogue" => Self::Dialogue,
            "function" | FUNCTION_CALL_ALIAS => Self::Function,
            "jump" => Self::Jump,
            "wait" => Self::Wait,
            "show" => Self::Show,
            CONDITION_TAG => Self::Condition,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Dialogue => "dialogue",
            Self::Function => "function",
            Self::Jump => "jump",
            Self::Wait => "wait",
            Self::Show => "show",
            Self::Condition => CONDITION_TAG,
            Self::Other(tag) => tag,
        }
    }

    #[must_use]
    pub const fn is_condition(&self) -> bool {
        matches!(self, Self::Condition)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&raw))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Originating line, or for condition nodes the trigger line followed by
    /// its `Variants:`/`Option` metadata lines.
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScriptEdge {
    #[serde(rename = "from_id")]
    pub from: NodeId,
    #[serde(rename = "to_id")]
    pub to: NodeId,
}

impl ScriptEdge {
    #[must_use]
    pub const fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

/// Graph for one `---`-delimited section of a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SectionGraph {
    pub name: String,
    pub nodes: Vec<ScriptNode>,
    pub edges: Vec<ScriptEdge>,
}

impl SectionGraph {
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn outgoing(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|edge| edge.from == id)
            .map(|edge| edge.to)
            .collect()
    }

    #[must_use]
    pub fn incoming(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|edge| edge.to == id)
            .map(|edge| edge.from)
            .collect()
    }

    #[must_use]
    pub fn condition_nodes(&self) -> Vec<&ScriptNode> {
        self.nodes
            .iter()
            .filter(|node| node.node_type.is_condition())
            .collect()
    }

    /// Every edge points from an earlier node to a later one.
    #[must_use]
    pub fn is_forward_only(&self) -> bool {
        self.edges.iter().all(|edge| edge.from < edge.to)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ParseWarningCode {
    UnterminatedConditional,
    NestedConditional,
    StrayEndif,
}

impl ParseWarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnterminatedConditional => "snil/warn/unterminated-conditional",
            Self::NestedConditional => "snil/warn/nested-conditional",
            Self::StrayEndif => "snil/warn/stray-endif",
        }
    }
}

/// Recoverable oddity found while building a graph. Never aborts a parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseWarning {
    pub code: ParseWarningCode,
    pub message: String,
    /// 1-based line in the whole document.
    pub line: usize,
}

impl ParseWarning {
    #[must_use]
    pub fn new(code: ParseWarningCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} [{}]", self.line, self.message, self.code.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ParseResult {
    pub sections: Vec<SectionGraph>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseResult {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.sections.iter().map(|section| section.nodes.len()).sum()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.sections.iter().map(|section| section.edges.len()).sum()
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionGraph> {
        self.sections.iter().find(|section| section.name == name)
    }
}
