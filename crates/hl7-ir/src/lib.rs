#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # hl7-ir
//!
//! In-memory model for HL7 v2 messages.
//!
//! A [`Message`] owns its [`Segment`]s, each segment owns its [`Field`]s, and
//! fields break down into components and subcomponents, optionally grouped
//! into repetitions. The delimiters in effect are carried per message as a
//! [`SeparatorSet`], since every message declares its own in the header.

/// Ordered message collections with provenance.
pub mod collection;
/// Validation findings attached to messages.
pub mod metadata;
/// Message type with derived header metadata.
pub mod message;
/// Field, component and subcomponent primitives.
pub mod node;
/// Dotted path navigation (`PID.5.1`).
pub mod path;
/// Segment records.
pub mod segment;
/// Message-local delimiter alphabet.
pub mod separators;
/// Known version tags.
pub mod version;

pub use collection::{MessageCollection, Provenance};
pub use message::Message;
pub use metadata::{FindingKind, Location, ValidationLevel, ValidationResult};
pub use node::{Component, Field, FieldMeta, FieldValue, Repetition, Subcomponent};
pub use path::FieldPath;
pub use segment::Segment;
pub use separators::{HEADER_SEGMENTS, MESSAGE_HEADER, SeparatorSet, is_header_record};
pub use version::Hl7Version;

use thiserror::Error;

/// Errors that can occur when working with the model
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl Error {
    /// Build a not-found error with lookup context.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Build an invalid-path error with input path and parsing reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;
