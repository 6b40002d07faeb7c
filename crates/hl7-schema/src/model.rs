//! Schema model definitions

use hl7_ir::Hl7Version;
use serde::{Deserialize, Serialize};

/// Definition of one field position within a segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Position within the segment (1-based)
    pub position: usize,
    /// Display name
    pub name: String,
    /// Data type tag (e.g. "XPN")
    pub data_type: String,
    pub required: bool,
    pub repeatable: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Code table consulted for display lookups
    pub table_id: Option<String>,
}

impl FieldDefinition {
    /// Create an optional, non-repeatable field definition
    pub fn new(position: usize, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            data_type: data_type.into(),
            required: false,
            repeatable: false,
            min_length: None,
            max_length: None,
            table_id: None,
        }
    }

    /// Mark as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as repeatable
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Set max length
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Set min and max length
    #[must_use]
    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    /// Reference a code table
    #[must_use]
    pub fn table(mut self, table_id: impl Into<String>) -> Self {
        self.table_id = Some(table_id.into());
        self
    }
}

/// Definition of a segment
///
/// Field definitions are stored by position so lookup is O(1) and iteration
/// follows field order. Gaps are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDefinition {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub repeatable: bool,
    fields: Vec<Option<FieldDefinition>>,
}

impl SegmentDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            repeatable: false,
            fields: Vec::new(),
        }
    }

    /// Mark as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as repeatable
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Add a field definition, replacing any existing one at the same position
    #[must_use]
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.insert_field(field);
        self
    }

    /// Insert a field definition. Position 0 is ignored.
    pub fn insert_field(&mut self, field: FieldDefinition) {
        let Some(index) = field.position.checked_sub(1) else {
            return;
        };
        if self.fields.len() <= index {
            self.fields.resize(index + 1, None);
        }
        self.fields[index] = Some(field);
    }

    /// Field definition at a position (1-based)
    #[must_use]
    pub fn field(&self, position: usize) -> Option<&FieldDefinition> {
        position
            .checked_sub(1)
            .and_then(|index| self.fields.get(index))
            .and_then(Option::as_ref)
    }

    /// Defined fields in position order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().flatten()
    }

    /// Number of defined fields
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    /// Highest defined position, or 0 without fields
    #[must_use]
    pub fn max_position(&self) -> usize {
        self.fields.iter().rposition(Option::is_some).map_or(0, |index| index + 1)
    }
}

/// Definition of a message type and the segments it requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDefinition {
    /// Message type key (e.g. "ADT^A01")
    pub message_type: String,
    pub description: String,
    /// Segments in expected order
    pub segments: Vec<String>,
    /// Segments that must be present
    pub required_segments: Vec<String>,
    pub version: Option<Hl7Version>,
}

impl MessageDefinition {
    pub fn new(message_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            description: description.into(),
            segments: Vec::new(),
            required_segments: Vec::new(),
            version: None,
        }
    }

    /// Add a required segment
    #[must_use]
    pub fn require(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        if !self.segments.contains(&segment) {
            self.segments.push(segment.clone());
        }
        if !self.required_segments.contains(&segment) {
            self.required_segments.push(segment);
        }
        self
    }

    /// Add an optional segment
    #[must_use]
    pub fn allow(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        if !self.segments.contains(&segment) {
            self.segments.push(segment);
        }
        self
    }

    /// Set the version tag
    #[must_use]
    pub fn version(mut self, version: Hl7Version) -> Self {
        self.version = Some(version);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_definition_builder() {
        let field = FieldDefinition::new(3, "Patient Identifier List", "CX")
            .required()
            .repeatable()
            .max_length(250);
        assert!(field.required);
        assert!(field.repeatable);
        assert_eq!(field.max_length, Some(250));
        assert_eq!(field.min_length, None);
    }

    #[test]
    fn test_segment_field_lookup_with_gaps() {
        let segment = SegmentDefinition::new("ZZZ", "Custom")
            .with_field(FieldDefinition::new(3, "Third", "ST"))
            .with_field(FieldDefinition::new(1, "First", "ST"));

        assert_eq!(segment.field(1).unwrap().name, "First");
        assert!(segment.field(2).is_none());
        assert_eq!(segment.field(3).unwrap().name, "Third");
        assert!(segment.field(0).is_none());
        assert!(segment.field(4).is_none());
        assert_eq!(segment.field_count(), 2);
        assert_eq!(segment.max_position(), 3);
        assert_eq!(SegmentDefinition::new("ZZZ", "").max_position(), 0);
        let names: Vec<&str> = segment.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Third"]);
    }

    #[test]
    fn test_replacing_a_field() {
        let segment = SegmentDefinition::new("ZZZ", "")
            .with_field(FieldDefinition::new(1, "Old", "ST"))
            .with_field(FieldDefinition::new(1, "New", "NM"));
        assert_eq!(segment.field_count(), 1);
        assert_eq!(segment.field(1).unwrap().data_type, "NM");
    }

    #[test]
    fn test_message_definition_required_segments() {
        let def = MessageDefinition::new("ADT^A01", "Admit")
            .require("MSH")
            .allow("NK1")
            .require("PID")
            .require("PID");
        assert_eq!(def.segments, vec!["MSH", "NK1", "PID"]);
        assert_eq!(def.required_segments, vec!["MSH", "PID"]);
    }
}
