//! Immutable schema registry and its builder

use crate::builtin;
use crate::codetable::CodeTable;
use crate::loader::SchemaLoader;
use crate::model::{FieldDefinition, MessageDefinition, SegmentDefinition};
use crate::{Error, Result};
use hl7_ir::{FieldMeta, Message};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace};

/// Read-only catalog of segment, message, data type and code table
/// definitions
///
/// Built once through [`SchemaRegistryBuilder`] and shared (typically behind
/// an `Arc`) by every validation run.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    segments: HashMap<String, SegmentDefinition>,
    messages: HashMap<String, MessageDefinition>,
    patterns: HashMap<String, Regex>,
    code_tables: HashMap<String, CodeTable>,
    segment_descriptions: HashMap<String, String>,
    message_codes: HashMap<String, String>,
}

impl SchemaRegistry {
    /// Start an empty builder
    #[must_use]
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Registry holding the builtin catalog
    ///
    /// # Errors
    ///
    /// Returns an error if a builtin definition is inconsistent.
    pub fn builtin() -> Result<Self> {
        SchemaRegistryBuilder::builtin().build()
    }

    /// Segment definition by name
    #[must_use]
    pub fn segment(&self, name: &str) -> Option<&SegmentDefinition> {
        self.segments.get(name)
    }

    /// Field definition by segment name and position (1-based)
    #[must_use]
    pub fn field(&self, segment: &str, position: usize) -> Option<&FieldDefinition> {
        self.segment(segment).and_then(|s| s.field(position))
    }

    /// Known segment names, sorted
    #[must_use]
    pub fn segment_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.segments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Message definition by exact key
    #[must_use]
    pub fn message(&self, message_type: &str) -> Option<&MessageDefinition> {
        self.messages.get(message_type)
    }

    /// Message definition for a message type given as its components.
    ///
    /// Tries the full type, then the first two components, then the first
    /// component alone.
    #[must_use]
    pub fn message_definition_for<S: AsRef<str>>(&self, parts: &[S]) -> Option<&MessageDefinition> {
        let keys = [parts.len(), 2, 1];
        keys.iter()
            .filter(|&&n| n > 0 && n <= parts.len())
            .map(|&n| join_parts(&parts[..n]))
            .find_map(|key| self.messages.get(&key))
    }

    /// Compiled validation pattern for a data type tag
    #[must_use]
    pub fn pattern(&self, data_type: &str) -> Option<&Regex> {
        self.patterns.get(data_type)
    }

    /// Code table by id
    #[must_use]
    pub fn code_table(&self, table_id: &str) -> Option<&CodeTable> {
        self.code_tables.get(table_id)
    }

    /// Description of a code within a table
    #[must_use]
    pub fn describe_code(&self, table_id: &str, code: &str) -> Option<&str> {
        self.code_table(table_id).and_then(|t| t.lookup(code))
    }

    /// Human-readable description of a segment code
    #[must_use]
    pub fn describe_segment(&self, name: &str) -> Option<&str> {
        self.segment_descriptions.get(name).map(String::as_str)
    }

    /// Human-readable message type, e.g. `Admit, Discharge, Transfer (ADT^A01)`
    ///
    /// Types with fewer than two components are returned unchanged.
    #[must_use]
    pub fn describe_message_type(&self, message_type: &str, component_separator: char) -> String {
        if message_type.is_empty() {
            return "Unknown".to_string();
        }
        let mut parts = message_type.split(component_separator);
        match (parts.next(), parts.next()) {
            (Some(code), Some(_)) => {
                let description = self.message_codes.get(code).map_or(code, String::as_str);
                format!("{description} ({message_type})")
            }
            _ => message_type.to_string(),
        }
    }

    /// Attach field metadata from the segment definitions to every matching
    /// field. Raw text is left intact.
    pub fn annotate(&self, message: &mut Message) {
        let mut updates = Vec::new();
        for (index, segment) in message.segments().iter().enumerate() {
            let Some(definition) = self.segment(segment.name()) else {
                continue;
            };
            for field in segment.fields() {
                if let Some(field_def) = definition.field(field.position) {
                    updates.push((index, field.position, field_meta(field_def)));
                }
            }
        }
        trace!(fields = updates.len(), "annotating message");
        for (index, position, meta) in updates {
            message.set_field_meta(index, position, meta);
        }
    }
}

fn field_meta(definition: &FieldDefinition) -> FieldMeta {
    FieldMeta {
        name: definition.name.clone(),
        data_type: definition.data_type.clone(),
        required: definition.required,
        max_length: definition.max_length,
    }
}

fn join_parts<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("^")
}

/// Mutable staging area for a [`SchemaRegistry`]
///
/// Later definitions replace earlier ones with the same key. Patterns are
/// compiled and table references checked in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistryBuilder {
    segments: HashMap<String, SegmentDefinition>,
    messages: HashMap<String, MessageDefinition>,
    patterns: HashMap<String, String>,
    code_tables: HashMap<String, CodeTable>,
    segment_descriptions: HashMap<String, String>,
    message_codes: HashMap<String, String>,
}

impl SchemaRegistryBuilder {
    /// Empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with the builtin catalog
    #[must_use]
    pub fn builtin() -> Self {
        let mut builder = Self::new();
        for segment in builtin::segments() {
            builder = builder.segment(segment);
        }
        for message in builtin::messages() {
            builder = builder.message(message);
        }
        for (data_type, pattern) in builtin::DATA_TYPE_PATTERNS {
            builder = builder.pattern(*data_type, *pattern);
        }
        for table in builtin::code_tables() {
            builder = builder.code_table(table);
        }
        for (name, description) in builtin::SEGMENT_DESCRIPTIONS {
            builder = builder.segment_description(*name, *description);
        }
        for (code, description) in builtin::MESSAGE_CODES {
            builder = builder.message_code(*code, *description);
        }
        builder
    }

    /// Add or replace a segment definition
    #[must_use]
    pub fn segment(mut self, definition: SegmentDefinition) -> Self {
        self.segments.insert(definition.name.clone(), definition);
        self
    }

    /// Add or replace a message definition
    #[must_use]
    pub fn message(mut self, definition: MessageDefinition) -> Self {
        self.messages
            .insert(definition.message_type.clone(), definition);
        self
    }

    /// Add or replace a data type pattern
    #[must_use]
    pub fn pattern(mut self, data_type: impl Into<String>, regex: impl Into<String>) -> Self {
        self.patterns.insert(data_type.into(), regex.into());
        self
    }

    /// Add or replace a code table
    #[must_use]
    pub fn code_table(mut self, table: CodeTable) -> Self {
        self.code_tables.insert(table.id.clone(), table);
        self
    }

    #[must_use]
    pub fn segment_description(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.segment_descriptions
            .insert(name.into(), description.into());
        self
    }

    #[must_use]
    pub fn message_code(mut self, code: impl Into<String>, description: impl Into<String>) -> Self {
        self.message_codes.insert(code.into(), description.into());
        self
    }

    /// Merge definitions from a JSON or YAML schema file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(self, path: &Path) -> Result<Self> {
        let file = SchemaLoader::load_from_file(path)?;
        Ok(file.apply(self))
    }

    /// Compile patterns, check table references and freeze the registry
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for a pattern that does not compile
    /// and [`Error::UnknownCodeTable`] for a field referencing a missing table.
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut patterns = HashMap::with_capacity(self.patterns.len());
        for (data_type, source) in self.patterns {
            let regex = Regex::new(&source)
                .map_err(|e| Error::invalid_pattern(&data_type, e.to_string()))?;
            patterns.insert(data_type, regex);
        }

        let mut segment_names: Vec<&String> = self.segments.keys().collect();
        segment_names.sort();
        for name in segment_names {
            let segment = &self.segments[name];
            let missing = segment.fields().find_map(|field| {
                field
                    .table_id
                    .as_ref()
                    .filter(|id| !self.code_tables.contains_key(*id))
                    .map(|id| (field.position, id))
            });
            if let Some((position, table_id)) = missing {
                return Err(Error::unknown_code_table(name, position, table_id));
            }
        }

        debug!(
            segments = self.segments.len(),
            messages = self.messages.len(),
            patterns = patterns.len(),
            code_tables = self.code_tables.len(),
            "schema registry built"
        );

        Ok(SchemaRegistry {
            segments: self.segments,
            messages: self.messages,
            patterns,
            code_tables: self.code_tables,
            segment_descriptions: self.segment_descriptions,
            message_codes: self.message_codes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl7_ir::{Field, Segment, SeparatorSet};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builtin().unwrap()
    }

    #[test]
    fn test_builtin_segments() {
        let registry = registry();
        assert_eq!(registry.segment("MSH").unwrap().field_count(), 19);
        assert_eq!(registry.segment("PID").unwrap().field_count(), 20);
        assert_eq!(registry.segment("PV1").unwrap().field_count(), 10);
        assert_eq!(registry.segment("OBX").unwrap().field_count(), 11);
        assert_eq!(registry.segment("EVN").unwrap().field_count(), 6);
        assert_eq!(registry.segment("NK1").unwrap().field_count(), 5);
        assert!(registry.segment("ZZZ").is_none());
        assert_eq!(registry.segment_names(), vec!["EVN", "MSH", "NK1", "OBX", "PID", "PV1"]);
    }

    #[test]
    fn test_field_lookup() {
        let registry = registry();
        let field = registry.field("PID", 5).unwrap();
        assert_eq!(field.name, "Patient Name");
        assert_eq!(field.data_type, "XPN");
        assert!(field.required);
        assert!(field.repeatable);
        assert!(registry.field("PID", 21).is_none());
        assert!(registry.field("PID", 0).is_none());
    }

    #[test]
    fn test_message_definition_fallback() {
        let registry = registry();
        let full = registry
            .message_definition_for(&["ADT", "A01", "ADT_A01"])
            .unwrap();
        assert_eq!(full.message_type, "ADT^A01");
        assert!(full.required_segments.contains(&"PV1".to_string()));

        let ack = registry.message_definition_for(&["ACK", "A01"]).unwrap();
        assert_eq!(ack.message_type, "ACK");

        assert!(registry.message_definition_for(&["ZZZ", "Z01"]).is_none());
        assert!(registry.message_definition_for::<&str>(&[]).is_none());
    }

    #[test]
    fn test_patterns() {
        let registry = registry();
        let dt = registry.pattern("DT").unwrap();
        assert!(dt.is_match("20230101"));
        assert!(!dt.is_match("2023-01-01"));
        let si = registry.pattern("SI").unwrap();
        assert!(si.is_match("1"));
        assert!(!si.is_match("12345"));
        assert!(registry.pattern("XCN").is_none());
    }

    #[test]
    fn test_describe_code() {
        let registry = registry();
        assert_eq!(registry.describe_code("0001", "f"), Some("Female"));
        assert_eq!(registry.describe_code("0004", "I"), Some("Inpatient"));
        assert_eq!(registry.describe_code("0001", "Q"), None);
        assert_eq!(registry.describe_code("9999", "F"), None);
    }

    #[test]
    fn test_describe_segment_and_message_type() {
        let registry = registry();
        assert!(registry.describe_segment("PID").unwrap().starts_with("Patient Identification"));
        assert_eq!(
            registry.describe_message_type("ADT^A01", '^'),
            "Admit, Discharge, Transfer (ADT^A01)"
        );
        assert_eq!(registry.describe_message_type("ZZZ^Z01", '^'), "ZZZ (ZZZ^Z01)");
        assert_eq!(registry.describe_message_type("ADT", '^'), "ADT");
        assert_eq!(registry.describe_message_type("", '^'), "Unknown");
    }

    #[test]
    fn test_invalid_pattern_is_a_build_error() {
        let result = SchemaRegistry::builder().pattern("XX", "([unclosed").build();
        assert!(matches!(result, Err(Error::InvalidPattern { data_type, .. }) if data_type == "XX"));
    }

    #[test]
    fn test_unknown_table_is_a_build_error() {
        let segment = SegmentDefinition::new("ZZZ", "Custom")
            .with_field(FieldDefinition::new(2, "Coded", "IS").table("7777"));
        let result = SchemaRegistry::builder().segment(segment).build();
        match result {
            Err(Error::UnknownCodeTable { segment, position, table_id }) => {
                assert_eq!(segment, "ZZZ");
                assert_eq!(position, 2);
                assert_eq!(table_id, "7777");
            }
            other => panic!("expected UnknownCodeTable, got {other:?}"),
        }
    }

    #[test]
    fn test_later_definitions_replace_earlier() {
        let registry = SchemaRegistryBuilder::builtin()
            .segment(SegmentDefinition::new("PID", "Slim").with_field(FieldDefinition::new(1, "Only", "ST")))
            .build()
            .unwrap();
        assert_eq!(registry.segment("PID").unwrap().field_count(), 1);
    }

    #[test]
    fn test_annotate_keeps_raw() {
        let registry = registry();
        let mut pid = Segment::new("PID");
        pid.set_field_value(5, "DOE^JOHN");
        let pid = Segment::from_parts("PID", pid.fields().to_vec(), Some("PID|||||DOE^JOHN".into()), 2);
        let mut message = Message::from_parts(
            vec![pid, Segment::from_parts("ZZZ", vec![Field::scalar(1, "x")], None, 3)],
            SeparatorSet::default(),
            Some("raw".into()),
        );

        registry.annotate(&mut message);

        let meta = message.segment(0).unwrap().field(5).unwrap().meta.as_ref().unwrap();
        assert_eq!(meta.name, "Patient Name");
        assert_eq!(meta.max_length, Some(250));
        assert!(message.segment(1).unwrap().field(1).unwrap().meta.is_none());
        assert_eq!(message.raw(), Some("raw"));
        assert_eq!(message.segment(0).unwrap().raw(), Some("PID|||||DOE^JOHN"));
    }
}
