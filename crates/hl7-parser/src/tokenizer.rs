//! Built-in hierarchical tokenizer
//!
//! Records are split on carriage return or line feed, fields on the field
//! separator, then repetitions, components and subcomponents in turn. The
//! delimiters come from the message's own header record.

use crate::strategy::TokenizerStrategy;
use crate::{Error, Result};
use hl7_ir::{Component, Field, HEADER_SEGMENTS, Message, Repetition, Segment, SeparatorSet};
use tracing::{debug, trace, warn};

/// The always-available tokenizer, tried last
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTokenizer;

impl TokenizerStrategy for BuiltinTokenizer {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn tokenize(&self, text: &str) -> Result<Message> {
        tokenize(text)
    }
}

/// Tokenize one message's text.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] when the text holds no records.
pub fn tokenize(text: &str) -> Result<Message> {
    let records = split_records(text);
    let Some(first) = records.first() else {
        return Err(Error::EmptyInput);
    };

    let separators = resolve_separators(first);

    let segments: Vec<Segment> = records
        .iter()
        .enumerate()
        .map(|(index, record)| tokenize_segment(record, index + 1, &separators))
        .collect();

    debug!(segments = segments.len(), "tokenized message");
    Ok(Message::from_parts(
        segments,
        separators,
        Some(text.to_string()),
    ))
}

/// Non-empty, trimmed records of a message
#[must_use]
pub fn split_records(text: &str) -> Vec<&str> {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect()
}

fn resolve_separators(first: &str) -> SeparatorSet {
    if let Some(separators) = SeparatorSet::from_header(first) {
        return separators;
    }
    if HEADER_SEGMENTS.iter().any(|code| first.starts_with(code)) {
        warn!(record = first, "header record too short, using default separators");
    } else {
        debug!("first record is not a header, using default separators");
    }
    SeparatorSet::default()
}

/// Tokenize one record into a segment. A record starting with the field
/// separator gives a segment with an empty name.
#[must_use]
pub fn tokenize_segment(record: &str, line: usize, separators: &SeparatorSet) -> Segment {
    let mut tokens = record.split(separators.field);
    let name = tokens.next().unwrap_or_default();
    if name.is_empty() {
        debug!(line, "record has no segment name");
    }

    let mut fields = Vec::new();
    if HEADER_SEGMENTS.contains(&name) {
        // Field 1 is the separator itself and field 2 the encoding block.
        fields.push(Field::scalar(1, separators.field.to_string()));
        if let Some(encoding) = tokens.next() {
            fields.push(Field::scalar(2, encoding));
        }
    }
    let offset = fields.len() + 1;
    fields.extend(
        tokens
            .enumerate()
            .map(|(i, raw)| parse_field(raw, i + offset, separators)),
    );

    trace!(segment = name, line, fields = fields.len(), "tokenized segment");
    Segment::from_parts(name, fields, Some(record.to_string()), line)
}

/// Parse a field's raw text into components, or repetitions of components
/// when the text contains the repetition separator.
#[must_use]
pub fn parse_field(raw: &str, position: usize, separators: &SeparatorSet) -> Field {
    let fragments: Vec<&str> = raw.split(separators.repetition).collect();
    if fragments.len() > 1 {
        let repetitions = fragments
            .into_iter()
            .map(|fragment| Repetition::new(parse_components(fragment, separators)))
            .collect();
        Field::from_repetitions(position, repetitions)
    } else {
        Field::from_components(position, parse_components(raw, separators))
    }
}

fn parse_components(text: &str, separators: &SeparatorSet) -> Vec<Component> {
    text.split(separators.component)
        .enumerate()
        .map(|(i, part)| Component::parse(part, i + 1, separators))
        .collect()
}
