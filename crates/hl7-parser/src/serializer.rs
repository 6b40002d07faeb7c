//! HL7 serializer

use hl7_ir::{Message, MessageCollection};
use serde::{Deserialize, Serialize};

/// Segment terminator written between segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentTerminator {
    /// Carriage return, the wire standard
    #[default]
    Cr,
    Lf,
    CrLf,
}

impl SegmentTerminator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cr => "\r",
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Writes messages back to HL7 text
#[derive(Debug, Clone, Copy, Default)]
pub struct Hl7Serializer {
    terminator: SegmentTerminator,
    rebuild: bool,
}

impl Hl7Serializer {
    /// Create a serializer using carriage returns and preserved raw text
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn terminator(mut self, terminator: SegmentTerminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Re-assemble every segment from its fields, ignoring raw text
    #[must_use]
    pub fn rebuild(mut self, rebuild: bool) -> Self {
        self.rebuild = rebuild;
        self
    }

    /// Serialize one message. A message without segments falls back to its
    /// raw text.
    #[must_use]
    pub fn serialize_message(&self, message: &Message) -> String {
        if message.segment_count() == 0 {
            return message.raw().unwrap_or_default().to_string();
        }
        message.encode_segments(self.terminator.as_str(), self.rebuild)
    }

    /// Serialize a collection, separating messages with a blank line
    #[must_use]
    pub fn serialize_collection(&self, collection: &MessageCollection) -> String {
        let separator = self.terminator.as_str().repeat(2);
        collection
            .iter()
            .map(|m| self.serialize_message(m))
            .collect::<Vec<_>>()
            .join(&separator)
    }
}
