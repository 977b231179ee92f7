use sg_core::{NodeId, NodeType, ParseWarning, ScriptEdge, ScriptNode, SectionGraph};
use tracing::debug;

use crate::classifier::{Classification, LineClassifier};
use crate::conditional::{ConditionalBlock, SectionItem, SourceLine, section_items};
use crate::sections::{SourceSection, section_name};

/// Node(s) the next created node must be linked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Pending {
    #[default]
    Empty,
    Node(NodeId),
    /// Last node of the True and False chains of a finished conditional.
    BranchEnds([Option<NodeId>; 2]),
}

impl Pending {
    fn predecessors(self) -> impl Iterator<Item = NodeId> {
        let slots = match self {
            Self::Empty => [None, None],
            Self::Node(id) => [Some(id), None],
            Self::BranchEnds(ends) => ends,
        };
        slots.into_iter().flatten()
    }
}

pub(crate) struct GraphBuilder<'c> {
    graph: SectionGraph,
    classifier: &'c LineClassifier,
    next_id: usize,
}

impl<'c> GraphBuilder<'c> {
    pub(crate) fn new(name: String, classifier: &'c LineClassifier) -> Self {
        Self {
            graph: SectionGraph::empty(name),
            classifier,
            next_id: 0,
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.graph.edges.len()
    }

    pub(crate) fn finish(self) -> SectionGraph {
        self.graph
    }

    fn push_node(&mut self, node_type: NodeType, content: String) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.graph.nodes.push(ScriptNode {
            id,
            node_type,
            content,
        });
        id
    }

    fn link(&mut self, pending: Pending, to: NodeId) {
        for from in pending.predecessors() {
            self.graph.edges.push(ScriptEdge::new(from, to));
        }
    }

    fn push_line(&mut self, pending: Pending, line: &SourceLine<'_>) -> Pending {
        match self.classifier.classify(line.text) {
            Classification::Ignored => pending,
            Classification::Node(node_type) => {
                let id = self.push_node(node_type, line.text.to_string());
                self.link(pending, id);
                Pending::Node(id)
            }
        }
    }

    fn push_conditional(&mut self, pending: Pending, block: &ConditionalBlock<'_>) -> Pending {
        let condition = self.push_node(NodeType::Condition, block.content.clone());
        self.link(pending, condition);

        let true_end = self.push_branch(condition, &block.true_lines);
        let false_end = self.push_branch(condition, &block.false_lines);
        Pending::BranchEnds([true_end, false_end])
    }

    /// Chain `lines` after `condition`; returns the last node, if any.
    fn push_branch(&mut self, condition: NodeId, lines: &[SourceLine<'_>]) -> Option<NodeId> {
        let tail = lines
            .iter()
            .fold(Pending::Node(condition), |pending, line| {
                self.push_line(pending, line)
            });
        match tail {
            Pending::Node(id) if id != condition => Some(id),
            _ => None,
        }
    }
}

/// Build the graph of one section in a single forward pass.
#[must_use]
pub fn build_section(
    section: &SourceSection<'_>,
    classifier: &LineClassifier,
) -> (SectionGraph, Vec<ParseWarning>) {
    let lines: Vec<SourceLine<'_>> = section
        .text
        .split('\n')
        .enumerate()
        .map(|(offset, raw)| SourceLine {
            line: section.first_line + offset,
            text: raw.trim(),
        })
        .collect();

    let mut warnings = Vec::new();
    let items = section_items(&lines, &mut warnings);

    let mut builder = GraphBuilder::new(section_name(section.text, section.index), classifier);
    let mut pending = Pending::Empty;
    for item in &items {
        pending = match item {
            SectionItem::Line(line) => builder.push_line(pending, line),
            SectionItem::Conditional(block) => builder.push_conditional(pending, block),
        };
    }

    debug!(
        section = %builder.graph.name,
        nodes = builder.node_count(),
        edges = builder.edge_count(),
        warnings = warnings.len(),
        "built section graph"
    );
    (builder.finish(), warnings)
}
