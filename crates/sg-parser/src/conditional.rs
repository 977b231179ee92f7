use std::sync::LazyLock;

use regex::Regex;
use sg_core::{ParseWarning, ParseWarningCode};

static IF_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^if\s+\S").expect("conditional header regex must compile"));

const SHOW_VARIANT_HEADER: &str = "If Show Variant";
const TERMINATOR: &str = "endif";
const TRUE_MARKER: &str = "true:";
const FALSE_MARKER: &str = "false:";
const VARIANTS_PREFIX: &str = "variants:";
const OPTION_PREFIX: &str = "option";

/// One trimmed line with its 1-based document line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub line: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalBlock<'a> {
    pub header: SourceLine<'a>,
    /// Trigger line followed by its `Variants:`/`Option` metadata lines.
    pub content: String,
    pub true_lines: Vec<SourceLine<'a>>,
    pub false_lines: Vec<SourceLine<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionItem<'a> {
    Line(SourceLine<'a>),
    Conditional(ConditionalBlock<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Header,
    True,
    False,
}

#[must_use]
pub fn is_conditional_header(line: &str) -> bool {
    IF_HEADER.is_match(line) || line.eq_ignore_ascii_case(SHOW_VARIANT_HEADER)
}

/// Group a section's lines into plain lines and conditional blocks.
///
/// Nested headers, missing terminators and stray `endif` lines are reported
/// through `warnings`; none of them stop the scan.
pub fn section_items<'a>(
    lines: &[SourceLine<'a>],
    warnings: &mut Vec<ParseWarning>,
) -> Vec<SectionItem<'a>> {
    let mut items = Vec::new();
    let mut cursor = 0;

    while let Some(&line) = lines.get(cursor) {
        cursor += 1;
        if !is_conditional_header(line.text) {
            if line.text.eq_ignore_ascii_case(TERMINATOR) {
                warnings.push(ParseWarning::new(
                    ParseWarningCode::StrayEndif,
                    line.line,
                    "'endif' without an open conditional; treated as a statement",
                ));
            }
            items.push(SectionItem::Line(line));
            continue;
        }

        let (block, consumed) = extract_conditional(line, &lines[cursor..], warnings);
        cursor += consumed;
        items.push(SectionItem::Conditional(block));
    }

    items
}

/// Scan the lines after `header` up to and including the terminator.
/// Returns the block and how many lines of `rest` it consumed.
fn extract_conditional<'a>(
    header: SourceLine<'a>,
    rest: &[SourceLine<'a>],
    warnings: &mut Vec<ParseWarning>,
) -> (ConditionalBlock<'a>, usize) {
    let mut block = ConditionalBlock {
        header,
        content: header.text.to_string(),
        true_lines: Vec::new(),
        false_lines: Vec::new(),
    };
    let mut bucket = Bucket::Header;

    for (offset, &line) in rest.iter().enumerate() {
        let text = line.text;
        if text.eq_ignore_ascii_case(TERMINATOR) {
            return (block, offset + 1);
        }
        if text.eq_ignore_ascii_case(TRUE_MARKER) {
            bucket = Bucket::True;
            continue;
        }
        if text.eq_ignore_ascii_case(FALSE_MARKER) {
            bucket = Bucket::False;
            continue;
        }

        match bucket {
            Bucket::Header => {
                if starts_with_ignore_case(text, VARIANTS_PREFIX)
                    || starts_with_ignore_case(text, OPTION_PREFIX)
                {
                    block.content.push('\n');
                    block.content.push_str(text);
                }
            }
            Bucket::True | Bucket::False => {
                if is_conditional_header(text) {
                    warnings.push(ParseWarning::new(
                        ParseWarningCode::NestedConditional,
                        line.line,
                        format!(
                            "nested conditional '{text}' is not supported; treated as a statement"
                        ),
                    ));
                }
                if bucket == Bucket::True {
                    block.true_lines.push(line);
                } else {
                    block.false_lines.push(line);
                }
            }
        }
    }

    warnings.push(ParseWarning::new(
        ParseWarningCode::UnterminatedConditional,
        header.line,
        format!("conditional '{}' has no 'endif'; closed at end of section", header.text),
    ));
    (block, rest.len())
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
