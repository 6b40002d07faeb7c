//! Segment type: one record of a message

use crate::node::{Field, FieldMeta};
use crate::separators::{HEADER_SEGMENTS, SeparatorSet};
use serde::{Deserialize, Serialize};

/// One record of a message
///
/// Fields are addressed 1-based in O(1). Positions beyond the parsed count
/// are absent, not empty. The raw source text is kept for re-serialization
/// and dropped on any structural edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    name: String,
    fields: Vec<Field>,
    raw: Option<String>,
    line_number: usize,
}

impl Segment {
    /// Create an empty segment
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            raw: None,
            line_number: 0,
        }
    }

    /// Assemble a segment from tokenized parts
    pub fn from_parts(
        name: impl Into<String>,
        fields: Vec<Field>,
        raw: Option<String>,
        line_number: usize,
    ) -> Self {
        Self {
            name: name.into(),
            fields,
            raw,
            line_number,
        }
    }

    /// Segment type code (e.g., "PID")
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source line number (1-based ordinal of the record in its message, 0 if built in memory)
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Raw source text, if still valid
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Whether this is a header-layout segment (MSH, FHS, BHS)
    #[must_use]
    pub fn is_header(&self) -> bool {
        HEADER_SEGMENTS.contains(&self.name.as_str())
    }

    /// All fields in positional order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of parsed fields
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Get a field by position (1-based). Position 0 is never satisfied.
    #[must_use]
    pub fn field(&self, position: usize) -> Option<&Field> {
        position
            .checked_sub(1)
            .and_then(|index| self.fields.get(index))
    }

    /// Mutable access to a field (1-based). Invalidates the raw text.
    pub fn field_mut(&mut self, position: usize) -> Option<&mut Field> {
        let index = position.checked_sub(1)?;
        if index >= self.fields.len() {
            return None;
        }
        self.raw = None;
        self.fields.get_mut(index)
    }

    /// Scalar value of a field, or "" when the field is absent
    #[must_use]
    pub fn field_value(&self, position: usize) -> &str {
        self.field(position).map_or("", Field::value)
    }

    /// Set the scalar value of a field (1-based), extending the field list
    /// with empty fields if needed. Position 0 is ignored.
    pub fn set_field_value(&mut self, position: usize, value: impl Into<String>) {
        if position == 0 {
            return;
        }
        while self.fields.len() < position {
            let next = self.fields.len() + 1;
            self.fields.push(Field::new(next));
        }
        self.fields[position - 1].set_value(value);
        self.raw = None;
    }

    /// Append a field at the next position. Invalidates the raw text.
    pub fn push_field(&mut self, mut field: Field) {
        field.position = self.fields.len() + 1;
        self.fields.push(field);
        self.raw = None;
    }

    /// Attach schema metadata to a field. Not a structural edit: raw text is kept.
    pub fn set_field_meta(&mut self, position: usize, meta: FieldMeta) -> bool {
        match position.checked_sub(1).and_then(|i| self.fields.get_mut(i)) {
            Some(field) => {
                field.meta = Some(meta);
                true
            }
            None => false,
        }
    }

    /// Serialize to wire text: the raw text when still valid, otherwise
    /// re-assembled from the fields with the given separators.
    #[must_use]
    pub fn encode(&self, separators: &SeparatorSet) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => self.rebuild(separators),
        }
    }

    /// Re-assemble wire text from the fields, ignoring any raw text.
    ///
    /// For header segments field 1 is the field separator itself, so it is
    /// not emitted as a separate token.
    #[must_use]
    pub fn rebuild(&self, separators: &SeparatorSet) -> String {
        let skip = usize::from(self.is_header() && !self.fields.is_empty());
        let mut out = self.name.clone();
        for field in self.fields.iter().skip(skip) {
            out.push(separators.field);
            out.push_str(&field.encode(separators));
        }
        out
    }
}
