//! Message-boundary splitting
//!
//! A new message starts at any line beginning with a header code (`MSH`,
//! `FHS`, `BHS`) followed by its field separator. Boundaries are only looked
//! for at line starts, so nothing inside a message is ever split.

use hl7_ir::HEADER_SEGMENTS;

/// Split a multi-message blob into one trimmed span per message.
///
/// Text before the first header becomes its own span. Spans that are empty
/// after trimming are dropped.
#[must_use]
pub fn split_messages(text: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = line_starts(text)
        .filter(|&start| is_message_start(&text[start..]))
        .collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    let mut spans = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let span = text[start..end].trim();
        if !span.is_empty() {
            spans.push(span);
        }
    }
    spans
}

fn line_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0).chain(text.match_indices(['\r', '\n']).map(|(i, _)| i + 1))
}

/// Whether a line opens a message: a header code followed by a delimiter
fn is_message_start(line: &str) -> bool {
    HEADER_SEGMENTS.iter().any(|code| {
        line.strip_prefix(code)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| !c.is_alphanumeric() && !c.is_whitespace())
    })
}
