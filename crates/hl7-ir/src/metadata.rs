//! Validation findings attached to messages
#![allow(clippy::must_use_candidate)] // Constructor helpers are clear at call sites without #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent setters are designed for chaining.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl ValidationLevel {
    /// Whether this level makes a message unusable (ERROR or CRITICAL)
    pub fn is_error(self) -> bool {
        self >= Self::Error
    }

    /// Upper-case label used in reports
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    /// Message has no segments
    NoSegments,
    /// Header segment missing or not at index 0
    HeaderMissing,
    /// Segment required by the message definition is absent
    RequiredSegmentMissing,
    /// Segment carries more fields than its definition
    TooManyFields,
    /// Record without a segment name
    UnnamedSegment,
    /// Required field absent or empty
    RequiredFieldMissing,
    /// Scalar value longer than the defined maximum
    MaxLengthExceeded,
    /// Scalar value shorter than the defined minimum
    MinLengthNotMet,
    /// Scalar value does not match the data type pattern
    DataTypeMismatch,
    /// Span could not be tokenized
    ParseFailure,
}

/// Where a finding points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Message,
    Segment,
    Field,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Message => "message",
            Self::Segment => "segment",
            Self::Field => "field",
        };
        f.write_str(label)
    }
}

/// One validation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Severity
    pub level: ValidationLevel,

    /// Category
    pub kind: FindingKind,

    /// Human-readable message
    pub message: String,

    /// Location tag
    pub location: Location,

    /// Segment name, if the finding is tied to one
    pub segment_name: Option<String>,

    /// Field number (1-based)
    pub field_number: Option<usize>,

    /// Line number of the segment in its message (1-based)
    pub line_number: Option<usize>,
}

impl ValidationResult {
    /// Create a finding
    pub fn new(
        level: ValidationLevel,
        kind: FindingKind,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            level,
            kind,
            message: message.into(),
            location,
            segment_name: None,
            field_number: None,
            line_number: None,
        }
    }

    /// Create an ERROR finding
    pub fn error(kind: FindingKind, message: impl Into<String>, location: Location) -> Self {
        Self::new(ValidationLevel::Error, kind, message, location)
    }

    /// Create a WARNING finding
    pub fn warning(kind: FindingKind, message: impl Into<String>, location: Location) -> Self {
        Self::new(ValidationLevel::Warning, kind, message, location)
    }

    /// Attach a segment name
    pub fn with_segment(mut self, name: impl Into<String>) -> Self {
        self.segment_name = Some(name.into());
        self
    }

    /// Attach a field number (1-based)
    pub fn with_field(mut self, field_number: usize) -> Self {
        self.field_number = Some(field_number);
        self
    }

    /// Attach a line number
    pub fn with_line(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)?;
        match (&self.segment_name, self.field_number) {
            (Some(segment), Some(field)) => write!(f, " ({segment}.{field})")?,
            (Some(segment), None) => write!(f, " ({segment})")?,
            _ => {}
        }
        if let Some(line) = self.line_number {
            write!(f, " at line {line}")?;
        }
        Ok(())
    }
}
