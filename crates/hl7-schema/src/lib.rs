#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # hl7-schema
//!
//! Segment, message, data type and code table definitions for HL7 v2.
//!
//! The [`SchemaRegistry`] is built once through [`SchemaRegistryBuilder`],
//! optionally extended with custom JSON/YAML files, and is read-only
//! afterwards.
//!
//! ```
//! use hl7_schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builtin().unwrap();
//! assert_eq!(registry.field("PID", 5).unwrap().name, "Patient Name");
//! assert_eq!(registry.describe_code("0001", "F"), Some("Female"));
//! ```

pub mod builtin;
pub mod codetable;
pub mod loader;
pub mod model;
pub mod registry;

pub use codetable::CodeTable;
pub use loader::{SchemaFile, SchemaLoader};
pub use model::{FieldDefinition, MessageDefinition, SegmentDefinition};
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};

use thiserror::Error;

/// Errors that can occur when building or loading schemas
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Invalid pattern for data type {data_type}: {message}")]
    InvalidPattern { data_type: String, message: String },

    #[error("Field {segment}.{position} references unknown code table {table_id}")]
    UnknownCodeTable {
        segment: String,
        position: usize,
        table_id: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an invalid-pattern error for a data type.
    pub fn invalid_pattern(data_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            data_type: data_type.into(),
            message: message.into(),
        }
    }

    /// Build an unknown-code-table error for a field reference.
    pub fn unknown_code_table(
        segment: impl Into<String>,
        position: usize,
        table_id: impl Into<String>,
    ) -> Self {
        Self::UnknownCodeTable {
            segment: segment.into(),
            position,
            table_id: table_id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
