//! The built-in validation passes
//!
//! Each pass appends findings and never removes another pass's findings.

use crate::rules::{validate_length, validate_pattern, validate_required};
use hl7_ir::{FindingKind, Location, Message, Segment, ValidationResult};
use hl7_schema::{SchemaRegistry, SegmentDefinition};
use serde::{Deserialize, Serialize};

/// Identifies one of the built-in passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Structure,
    Segment,
    Field,
    DataType,
    Table,
}

impl PassKind {
    /// All built-in passes in run order
    pub const ALL: [Self; 5] = [
        Self::Structure,
        Self::Segment,
        Self::Field,
        Self::DataType,
        Self::Table,
    ];
}

/// One validation pass over a message
pub trait ValidationPass: Send + Sync {
    fn name(&self) -> &'static str;

    /// Append this pass's findings for `message`
    fn check(&self, message: &Message, registry: &SchemaRegistry, findings: &mut Vec<ValidationResult>);
}

/// Build the built-in pass for a kind
#[must_use]
pub fn builtin(kind: PassKind) -> Box<dyn ValidationPass> {
    match kind {
        PassKind::Structure => Box::new(StructurePass),
        PassKind::Segment => Box::new(SegmentPass),
        PassKind::Field => Box::new(FieldPass),
        PassKind::DataType => Box::new(DataTypePass),
        PassKind::Table => Box::new(TablePass),
    }
}

/// Segments that have a registry definition
fn defined_segments<'a>(
    message: &'a Message,
    registry: &'a SchemaRegistry,
) -> impl Iterator<Item = (&'a Segment, &'a SegmentDefinition)> + 'a {
    message
        .segments()
        .iter()
        .filter_map(move |segment| registry.segment(segment.name()).map(|def| (segment, def)))
}

fn field_finding(
    finding: ValidationResult,
    segment: &Segment,
    position: usize,
) -> ValidationResult {
    finding
        .with_segment(segment.name())
        .with_field(position)
        .with_line(segment.line_number())
}

/// Message-level structure: segments present, header first, required
/// segments of the matched message definition present
#[derive(Debug, Clone, Copy, Default)]
pub struct StructurePass;

impl ValidationPass for StructurePass {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn check(&self, message: &Message, registry: &SchemaRegistry, findings: &mut Vec<ValidationResult>) {
        let Some(first) = message.segment(0) else {
            findings.push(ValidationResult::error(
                FindingKind::NoSegments,
                "Message has no segments",
                Location::Message,
            ));
            return;
        };

        if !first.is_header() {
            findings.push(
                ValidationResult::error(
                    FindingKind::HeaderMissing,
                    format!("First segment must be MSH, found {}", first.name()),
                    Location::Segment,
                )
                .with_segment(first.name())
                .with_line(first.line_number()),
            );
        }

        let Some(definition) = registry.message_definition_for(message.message_type_parts().as_slice()) else {
            return;
        };
        for required in &definition.required_segments {
            if message.segment_named(required).is_none() {
                findings.push(
                    ValidationResult::error(
                        FindingKind::RequiredSegmentMissing,
                        format!("Required segment {required} is missing"),
                        Location::Message,
                    )
                    .with_segment(required.as_str()),
                );
            }
        }
    }
}

/// Unnamed records and over-populated segments
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentPass;

impl ValidationPass for SegmentPass {
    fn name(&self) -> &'static str {
        "segment"
    }

    fn check(&self, message: &Message, registry: &SchemaRegistry, findings: &mut Vec<ValidationResult>) {
        for segment in message.segments().iter().filter(|s| s.name().is_empty()) {
            findings.push(
                ValidationResult::warning(
                    FindingKind::UnnamedSegment,
                    format!("Segment at line {} has no name", segment.line_number()),
                    Location::Segment,
                )
                .with_line(segment.line_number()),
            );
        }

        for (segment, definition) in defined_segments(message, registry) {
            let expected = definition.max_position();
            let actual = segment.field_count();
            if actual > expected {
                findings.push(
                    ValidationResult::warning(
                        FindingKind::TooManyFields,
                        format!(
                            "Segment {} has {actual} fields, expected {expected}",
                            segment.name()
                        ),
                        Location::Segment,
                    )
                    .with_segment(segment.name())
                    .with_line(segment.line_number()),
                );
            }
        }
    }
}

/// Required fields and length bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldPass;

impl ValidationPass for FieldPass {
    fn name(&self) -> &'static str {
        "field"
    }

    fn check(&self, message: &Message, registry: &SchemaRegistry, findings: &mut Vec<ValidationResult>) {
        for (segment, definition) in defined_segments(message, registry) {
            for field_def in definition.fields().filter(|f| f.required) {
                // The separator fields of a header are checked for presence only.
                let presence_only = segment.is_header() && field_def.position <= 2;
                let rule = validate_required(
                    segment.field(field_def.position),
                    &field_def.name,
                    presence_only,
                );
                if let Some(text) = rule.message {
                    findings.push(field_finding(
                        ValidationResult::error(FindingKind::RequiredFieldMissing, text, Location::Field),
                        segment,
                        field_def.position,
                    ));
                }
            }

            for field in segment.fields() {
                let Some(field_def) = definition.field(field.position) else {
                    continue;
                };
                let value = field.value();
                let checks = [
                    (
                        FindingKind::MaxLengthExceeded,
                        validate_length(value, &field_def.name, None, field_def.max_length),
                    ),
                    (
                        FindingKind::MinLengthNotMet,
                        validate_length(value, &field_def.name, field_def.min_length, None),
                    ),
                ];
                for (kind, rule) in checks {
                    if let Some(text) = rule.message {
                        findings.push(field_finding(
                            ValidationResult::warning(kind, text, Location::Field),
                            segment,
                            field.position,
                        ));
                    }
                }
            }
        }
    }
}

/// Scalar values against data type patterns
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTypePass;

impl ValidationPass for DataTypePass {
    fn name(&self) -> &'static str {
        "data_type"
    }

    fn check(&self, message: &Message, registry: &SchemaRegistry, findings: &mut Vec<ValidationResult>) {
        for (segment, definition) in defined_segments(message, registry) {
            for field in segment.fields() {
                let Some(field_def) = definition.field(field.position) else {
                    continue;
                };
                let Some(pattern) = registry.pattern(&field_def.data_type) else {
                    continue;
                };
                let rule = validate_pattern(field.value(), &field_def.name, &field_def.data_type, pattern);
                if let Some(text) = rule.message {
                    findings.push(field_finding(
                        ValidationResult::warning(FindingKind::DataTypeMismatch, text, Location::Field),
                        segment,
                        field.position,
                    ));
                }
            }
        }
    }
}

/// Code table membership. Emits nothing; code tables are used for display
/// lookups only. Replace it through
/// [`ValidationEngine::with_pass`](crate::ValidationEngine::with_pass).
#[derive(Debug, Clone, Copy, Default)]
pub struct TablePass;

impl ValidationPass for TablePass {
    fn name(&self) -> &'static str {
        "table"
    }

    fn check(&self, _message: &Message, _registry: &SchemaRegistry, _findings: &mut Vec<ValidationResult>) {}
}
