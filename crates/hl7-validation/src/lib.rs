#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # hl7-validation
//!
//! Multi-pass validation of HL7 v2 messages against a [`SchemaRegistry`].
//!
//! Validation never fails: every problem becomes a finding installed on the
//! message, replacing the findings of any earlier run.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use hl7_ir::{FindingKind, Message};
//! use hl7_schema::SchemaRegistry;
//! use hl7_validation::ValidationEngine;
//!
//! let engine = ValidationEngine::new(Arc::new(SchemaRegistry::builtin().unwrap()));
//!
//! let mut message = Message::default();
//! let findings = engine.validate(&mut message);
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].kind, FindingKind::NoSegments);
//! ```

pub mod engine;
pub mod passes;
pub mod reporter;
pub mod rules;

pub use engine::{ValidationConfig, ValidationEngine};
pub use passes::{
    DataTypePass, FieldPass, PassKind, SegmentPass, StructurePass, TablePass, ValidationPass,
};
pub use reporter::{MessageSummary, ValidationReport};
pub use rules::{RuleResult, validate_length, validate_pattern, validate_required};

use hl7_ir::Message;
use hl7_schema::SchemaRegistry;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by report plumbing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Validate a message with every built-in pass
pub fn validate(message: &mut Message, registry: Arc<SchemaRegistry>) -> bool {
    ValidationEngine::new(registry).validate(message);
    message.is_valid()
}
