//! Custom schema files (JSON or YAML)
//!
//! A schema file may carry any of four sections. Every section is optional:
//!
//! ```yaml
//! segments:
//!   - name: ZPI
//!     description: Custom patient info
//!     fields:
//!       - { position: 1, name: Set ID, data_type: SI, required: true, max_length: 4 }
//! messages:
//!   - { message_type: "ADT^A01", required_segments: [MSH, PID, ZPI] }
//! data_types:
//!   XCN: "^.*$"
//! code_tables:
//!   - { id: "9001", name: Custom, codes: { A: Alpha } }
//! ```

use crate::codetable::CodeTable;
use crate::model::{FieldDefinition, MessageDefinition, SegmentDefinition};
use crate::registry::SchemaRegistryBuilder;
use crate::{Error, Result};
use hl7_ir::Hl7Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, trace};

/// Deserialized custom schema file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    #[serde(default)]
    segments: Vec<SegmentFile>,
    #[serde(default)]
    messages: Vec<MessageFile>,
    #[serde(default)]
    data_types: BTreeMap<String, String>,
    #[serde(default)]
    code_tables: Vec<CodeTableFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SegmentFile {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    repeatable: bool,
    #[serde(default)]
    fields: Vec<FieldFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldFile {
    position: usize,
    name: String,
    data_type: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    repeatable: bool,
    #[serde(default)]
    min_length: Option<usize>,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    table_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageFile {
    message_type: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    segments: Vec<String>,
    #[serde(default)]
    required_segments: Vec<String>,
    #[serde(default)]
    version: Option<Hl7Version>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CodeTableFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    codes: BTreeMap<String, String>,
}

impl From<FieldFile> for FieldDefinition {
    fn from(file: FieldFile) -> Self {
        Self {
            position: file.position,
            name: file.name,
            data_type: file.data_type,
            required: file.required,
            repeatable: file.repeatable,
            min_length: file.min_length,
            max_length: file.max_length,
            table_id: file.table_id,
        }
    }
}

impl From<SegmentFile> for SegmentDefinition {
    fn from(file: SegmentFile) -> Self {
        let mut definition = SegmentDefinition::new(file.name, file.description);
        definition.required = file.required;
        definition.repeatable = file.repeatable;
        for field in file.fields {
            definition.insert_field(field.into());
        }
        definition
    }
}

impl From<MessageFile> for MessageDefinition {
    fn from(file: MessageFile) -> Self {
        let mut definition = MessageDefinition::new(file.message_type, file.description);
        definition.segments = file.segments;
        definition.version = file.version;
        for segment in file.required_segments {
            definition = definition.require(segment);
        }
        definition
    }
}

impl From<CodeTableFile> for CodeTable {
    fn from(file: CodeTableFile) -> Self {
        let mut table = CodeTable::new(file.id, file.name);
        for (code, description) in file.codes {
            table.insert(&code, description);
        }
        table
    }
}

impl SchemaFile {
    /// Merge every section into a builder. Entries replace existing ones by key.
    #[must_use]
    pub fn apply(self, mut builder: SchemaRegistryBuilder) -> SchemaRegistryBuilder {
        trace!(
            segments = self.segments.len(),
            messages = self.messages.len(),
            data_types = self.data_types.len(),
            code_tables = self.code_tables.len(),
            "applying schema file"
        );
        for segment in self.segments {
            builder = builder.segment(segment.into());
        }
        for message in self.messages {
            builder = builder.message(message.into());
        }
        for (data_type, pattern) in self.data_types {
            builder = builder.pattern(data_type, pattern);
        }
        for table in self.code_tables {
            builder = builder.code_table(table.into());
        }
        builder
    }
}

/// Reads custom schema files
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load a schema file, choosing YAML for `.yaml`/`.yml` and JSON otherwise
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::InvalidFormat`] when it does not parse.
    pub fn load_from_file(path: &Path) -> Result<SchemaFile> {
        info!(path = %path.display(), "loading custom schema");
        let content = std::fs::read_to_string(path)?;

        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::load_from_yaml(&content)
        } else {
            Self::load_from_json(&content)
        }
    }

    /// Parse a JSON schema document
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] on malformed input.
    pub fn load_from_json(json: &str) -> Result<SchemaFile> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))
    }

    /// Parse a YAML schema document
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] on malformed input.
    pub fn load_from_yaml(yaml: &str) -> Result<SchemaFile> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))
    }
}
