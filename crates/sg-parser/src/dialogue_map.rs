use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NAME_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*name\s*:\s*(.+)").expect("name declaration regex must compile")
});

/// A `name:` declaration and the 1-based line it sits on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialogueEntry {
    pub line: usize,
    pub name: String,
}

/// Index every `name:` declaration of a document, in document order.
///
/// Declarations whose name is blank after trimming are skipped.
#[must_use]
pub fn extract_dialogues(document: &str) -> Vec<DialogueEntry> {
    document
        .split('\n')
        .enumerate()
        .filter_map(|(offset, raw)| {
            let name = NAME_DECLARATION.captures(raw)?.get(1)?.as_str().trim();
            (!name.is_empty()).then(|| DialogueEntry {
                line: offset + 1,
                name: name.to_string(),
            })
        })
        .collect()
}

/// Line of the first entry named exactly `name`.
#[must_use]
pub fn dialogue_line(entries: &[DialogueEntry], name: &str) -> Option<usize> {
    entries
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.line)
}
