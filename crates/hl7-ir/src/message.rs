//! Message representation
#![allow(clippy::must_use_candidate)]

use crate::metadata::{ValidationLevel, ValidationResult};
use crate::node::{FieldMeta, encode_components};
use crate::path::FieldPath;
use crate::segment::Segment;
use crate::separators::{MESSAGE_HEADER, SeparatorSet};
use crate::version::Hl7Version;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MSH field holding the message type
pub const MESSAGE_TYPE_FIELD: usize = 9;
/// MSH field holding the control id
pub const CONTROL_ID_FIELD: usize = 10;
/// MSH field holding the version tag
pub const VERSION_FIELD: usize = 12;

/// One HL7 v2 message
///
/// Derived metadata (message type, control id, version) is computed on
/// demand from the first `MSH` segment, so it always reflects the current
/// structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    segments: Vec<Segment>,
    separators: SeparatorSet,
    created_at: DateTime<Utc>,
    raw: Option<String>,
    findings: Vec<ValidationResult>,
}

impl Default for Message {
    fn default() -> Self {
        Self::new(SeparatorSet::default())
    }
}

impl Message {
    /// Create an empty message using the given separators
    pub fn new(separators: SeparatorSet) -> Self {
        Self {
            segments: Vec::new(),
            separators,
            created_at: Utc::now(),
            raw: None,
            findings: Vec::new(),
        }
    }

    /// Assemble a message from tokenized parts
    pub fn from_parts(
        segments: Vec<Segment>,
        separators: SeparatorSet,
        raw: Option<String>,
    ) -> Self {
        Self {
            segments,
            separators,
            created_at: Utc::now(),
            raw,
            findings: Vec::new(),
        }
    }

    /// A message with no segments standing in for an unparseable span.
    ///
    /// The raw text is kept and the finding is installed so the message is
    /// never silently empty.
    pub fn degenerate(raw: impl Into<String>, finding: ValidationResult) -> Self {
        let mut message = Self::from_parts(Vec::new(), SeparatorSet::default(), Some(raw.into()));
        message.findings.push(finding);
        message
    }

    /// Separators in effect for this message
    pub fn separators(&self) -> &SeparatorSet {
        &self.separators
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Raw source text, if still valid
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    // Segment access

    /// All segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment by index (0-based)
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Mutable segment by index. Invalidates the message's raw text.
    pub fn segment_mut(&mut self, index: usize) -> Option<&mut Segment> {
        let segment = self.segments.get_mut(index)?;
        self.raw = None;
        Some(segment)
    }

    /// All segments with the given name
    pub fn segments_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |s| s.name() == name)
    }

    /// First segment with the given name
    pub fn segment_named(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name() == name)
    }

    /// The `n`-th (0-based) segment with the given name
    pub fn segment_nth(&self, name: &str, n: usize) -> Option<&Segment> {
        self.segments.iter().filter(|s| s.name() == name).nth(n)
    }

    /// The message header (first `MSH` segment)
    pub fn header(&self) -> Option<&Segment> {
        self.segment_named(MESSAGE_HEADER)
    }

    /// Append a segment. Invalidates the raw text.
    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
        self.raw = None;
    }

    /// Set a field's scalar value (1-based position) on the segment at
    /// `segment_index`, extending its field list if needed.
    ///
    /// Returns `false` when there is no such segment.
    pub fn set_field_value(
        &mut self,
        segment_index: usize,
        position: usize,
        value: impl Into<String>,
    ) -> bool {
        match self.segment_mut(segment_index) {
            Some(segment) => {
                segment.set_field_value(position, value);
                true
            }
            None => false,
        }
    }

    /// Attach schema metadata to a field without invalidating raw text
    pub fn set_field_meta(&mut self, segment_index: usize, position: usize, meta: FieldMeta) -> bool {
        self.segments
            .get_mut(segment_index)
            .is_some_and(|segment| segment.set_field_meta(position, meta))
    }

    // Derived metadata

    /// Full encoded value of MSH-9 (e.g. `ADT^A01^ADT_A01`), or "" without a header
    pub fn message_type(&self) -> String {
        self.header()
            .and_then(|msh| msh.field(MESSAGE_TYPE_FIELD))
            .map(|field| field.encode(&self.separators))
            .unwrap_or_default()
    }

    /// Component values of MSH-9 (first occurrence)
    pub fn message_type_parts(&self) -> Vec<String> {
        self.header()
            .and_then(|msh| msh.field(MESSAGE_TYPE_FIELD))
            .map(|field| {
                field
                    .components()
                    .iter()
                    .map(|c| c.encode(&self.separators))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// MSH-10 first component, or ""
    pub fn control_id(&self) -> &str {
        self.header()
            .map_or("", |msh| msh.field_value(CONTROL_ID_FIELD))
    }

    /// MSH-12 matched against the known versions. Unknown tags give `None`.
    pub fn version(&self) -> Option<Hl7Version> {
        self.header()
            .and_then(|msh| Hl7Version::from_tag(msh.field_value(VERSION_FIELD)))
    }

    // Findings

    /// Current findings
    pub fn findings(&self) -> &[ValidationResult] {
        &self.findings
    }

    /// Append one finding
    pub fn add_finding(&mut self, finding: ValidationResult) {
        self.findings.push(finding);
    }

    /// Remove all findings
    pub fn clear_findings(&mut self) {
        self.findings.clear();
    }

    /// Replace the findings wholesale
    pub fn set_findings(&mut self, findings: Vec<ValidationResult>) {
        self.findings = findings;
    }

    /// Whether any ERROR or CRITICAL finding is present
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.level.is_error())
    }

    /// Whether any WARNING finding is present
    pub fn has_warnings(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.level == ValidationLevel::Warning)
    }

    /// No ERROR or CRITICAL findings
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    // Serialization

    /// Wire text: the raw text when still valid, otherwise the segments
    /// joined with carriage returns.
    pub fn encode(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => self.encode_segments("\r", false),
        }
    }

    /// Join segments with `terminator`. With `rebuild` set, every segment is
    /// re-assembled from its fields and preserved raw text is ignored.
    pub fn encode_segments(&self, terminator: &str, rebuild: bool) -> String {
        let encoded: Vec<String> = self
            .segments
            .iter()
            .map(|s| {
                if rebuild {
                    s.rebuild(&self.separators)
                } else {
                    s.encode(&self.separators)
                }
            })
            .collect();
        encoded.join(terminator)
    }

    // Navigation

    /// Resolve a dotted path (e.g. `PID.5.1`) to its wire-encoded value.
    ///
    /// Malformed paths are an error; a well-formed path addressing an absent
    /// element gives `Ok(None)`.
    pub fn navigate(&self, path: &str) -> Result<Option<String>> {
        let path = FieldPath::parse(path)?;
        Ok(self.resolve(&path))
    }

    /// Resolve an already parsed path
    pub fn resolve(&self, path: &FieldPath) -> Option<String> {
        let seps = &self.separators;
        let segment = self.segment_nth(&path.segment, path.occurrence)?;
        let Some(position) = path.field else {
            return Some(segment.encode(seps));
        };
        let field = segment.field(position)?;

        let components = match path.repetition {
            Some(index) => field.repetition(index)?,
            None if path.component.is_none() => return Some(field.encode(seps)),
            None => field.components(),
        };
        let Some(component_position) = path.component else {
            return Some(encode_components(components, seps));
        };
        let component = components.get(component_position.checked_sub(1)?)?;

        match path.subcomponent {
            Some(sub) => component.subcomponent(sub).map(|s| s.value.clone()),
            None => Some(component.encode(seps)),
        }
    }
}
