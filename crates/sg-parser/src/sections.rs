use std::sync::LazyLock;

use regex::Regex;

/// Standalone line separating independent sections of a document.
pub const SECTION_DELIMITER: &str = "\n---\n";

static SECTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^name:\s*(.+)").expect("section name regex must compile")
});

/// A trimmed, non-blank slice of the document between delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSection<'a> {
    /// Position in the raw split, counting pieces that were dropped as blank.
    pub index: usize,
    pub text: &'a str,
    /// 1-based document line on which `text` starts.
    pub first_line: usize,
}

#[must_use]
pub fn split_sections(document: &str) -> Vec<SourceSection<'_>> {
    let mut sections = Vec::new();
    let mut piece_line = 1;

    for (index, piece) in document.split(SECTION_DELIMITER).enumerate() {
        let text = piece.trim();
        if !text.is_empty() {
            let leading = piece.len() - piece.trim_start().len();
            sections.push(SourceSection {
                index,
                text,
                first_line: piece_line + count_newlines(&piece[..leading]),
            });
        }
        // The delimiter contributes the `---` line plus the break after it.
        piece_line += count_newlines(piece) + 2;
    }

    sections
}

/// Name from the first `name:` line, or `Section <index + 1>`.
#[must_use]
pub fn section_name(text: &str, index: usize) -> String {
    SECTION_NAME
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().trim().to_string())
        .unwrap_or_else(|| format!("Section {}", index + 1))
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|byte| *byte == b'\n').count()
}
