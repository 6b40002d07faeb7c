//! File loading with charset detection and provenance

use crate::encoding::{BomSniffer, Decoded, EncodingDetector, decode, detect_and_decode};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use hl7_ir::{MessageCollection, Provenance};
use hl7_parser::Hl7Parser;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Default minimum detection confidence
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.7;

/// Reads HL7 files into message collections
#[derive(Clone)]
pub struct CollectionLoader {
    parser: Hl7Parser,
    detector: Arc<dyn EncodingDetector>,
    min_confidence: f32,
    encoding: Option<String>,
}

impl Default for CollectionLoader {
    fn default() -> Self {
        Self {
            parser: Hl7Parser::new(),
            detector: Arc::new(BomSniffer),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            encoding: None,
        }
    }
}

impl CollectionLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Hl7Parser) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_detector(mut self, detector: impl EncodingDetector + 'static) -> Self {
        self.detector = Arc::new(detector);
        self
    }

    /// Detections below this confidence decode as UTF-8
    #[must_use]
    pub fn min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Skip detection and always decode with this charset label
    #[must_use]
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    #[must_use]
    pub fn parser(&self) -> &Hl7Parser {
        &self.parser
    }

    /// Decode raw bytes with the forced charset or a detected one
    #[must_use]
    pub fn decode_bytes(&self, bytes: &[u8]) -> Decoded {
        match &self.encoding {
            Some(label) => decode(bytes, label),
            None => detect_and_decode(bytes, self.detector.as_ref(), self.min_confidence),
        }
    }

    /// Read and decode a file, returning its text and provenance
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read.
    pub fn read_file(&self, path: &Path) -> Result<(String, Provenance)> {
        let shown = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| Error::io("read", &shown, e.to_string()))?;
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        let decoded = self.decode_bytes(&bytes);
        info!(path = %shown, bytes = bytes.len(), charset = %decoded.charset, "read input file");

        let provenance = Provenance {
            path: Some(path.to_path_buf()),
            encoding: decoded.charset,
            modified,
        };
        Ok((decoded.text, provenance))
    }

    /// Load a file into a collection
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read. Unparseable
    /// messages do not fail the load; they become degenerate messages.
    pub fn load_file(&self, path: &Path) -> Result<MessageCollection> {
        let (text, provenance) = self.read_file(path)?;
        Ok(self.parser.parse_collection(&text).with_provenance(provenance))
    }

    /// Load raw bytes into a collection
    #[must_use]
    pub fn load_bytes(&self, bytes: &[u8]) -> MessageCollection {
        let decoded = self.decode_bytes(bytes);
        let provenance = Provenance {
            encoding: decoded.charset,
            ..Provenance::default()
        };
        self.parser.parse_collection(&decoded.text).with_provenance(provenance)
    }
}

impl fmt::Debug for CollectionLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionLoader")
            .field("parser", &self.parser)
            .field("min_confidence", &self.min_confidence)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}
