#![forbid(unsafe_code)]

//! Compiles SNIL dialogue scripts into per-section control-flow graphs.

mod classifier;
mod conditional;
mod dialogue_map;
mod graph_builder;
mod sections;

use serde_json::json;
use sg_core::ParseResult;
use tracing::debug;

pub use classifier::{Classification, ClassifierError, LineClassifier, PatternKind};
pub use conditional::{
    ConditionalBlock, SectionItem, SourceLine, is_conditional_header, section_items,
};
pub use dialogue_map::{DialogueEntry, dialogue_line, extract_dialogues};
pub use graph_builder::build_section;
pub use sections::{SECTION_DELIMITER, SourceSection, section_name, split_sections};

/// Parse with the built-in node type configuration.
#[must_use]
pub fn parse(input: &str) -> ParseResult {
    parse_with_classifier(input, LineClassifier::builtin())
}

#[must_use]
pub fn parse_with_classifier(input: &str, classifier: &LineClassifier) -> ParseResult {
    let mut result = ParseResult::default();
    for section in split_sections(input) {
        let (graph, warnings) = build_section(&section, classifier);
        result.sections.push(graph);
        result.warnings.extend(warnings);
    }

    debug!(
        sections = result.sections.len(),
        nodes = result.node_count(),
        edges = result.edge_count(),
        warnings = result.warnings.len(),
        "parsed document"
    );
    result
}

#[must_use]
pub fn parse_evidence_json(parsed: &ParseResult) -> String {
    let sections: Vec<_> = parsed
        .sections
        .iter()
        .map(|section| {
            json!({
                "name": section.name,
                "node_count": section.nodes.len(),
                "edge_count": section.edges.len(),
            })
        })
        .collect();
    let warnings: Vec<String> = parsed.warnings.iter().map(ToString::to_string).collect();

    json!({
        "section_count": parsed.sections.len(),
        "node_count": parsed.node_count(),
        "edge_count": parsed.edge_count(),
        "warning_count": parsed.warnings.len(),
        "warnings": warnings,
        "sections": sections,
    })
    .to_string()
}
