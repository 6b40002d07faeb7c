//! Charset detection and decoding
//!
//! Decoding never fails: undecodable bytes become U+FFFD.

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// A detector's guess at a byte stream's charset
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// WHATWG label, e.g. `utf-8` or `windows-1252`
    pub charset: String,
    /// 0.0 to 1.0
    pub confidence: f32,
}

impl Detection {
    pub fn new(charset: impl Into<String>, confidence: f32) -> Self {
        Self {
            charset: charset.into(),
            confidence,
        }
    }
}

/// Guesses the charset of raw bytes
pub trait EncodingDetector: Send + Sync {
    fn detect(&self, bytes: &[u8]) -> Detection;
}

/// Byte-order-mark sniffer, falling back to a UTF-8 validity check
#[derive(Debug, Clone, Copy, Default)]
pub struct BomSniffer;

impl EncodingDetector for BomSniffer {
    fn detect(&self, bytes: &[u8]) -> Detection {
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return Detection::new(label(encoding), 1.0);
        }
        if std::str::from_utf8(bytes).is_ok() {
            Detection::new("utf-8", 1.0)
        } else {
            Detection::new("utf-8", 0.5)
        }
    }
}

/// Decoded text and the charset actually used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub charset: String,
    /// Whether any bytes were replaced
    pub had_errors: bool,
}

/// Decode bytes with a charset label. Unknown labels decode as UTF-8 and a
/// byte-order mark overrides the label.
#[must_use]
pub fn decode(bytes: &[u8], charset: &str) -> Decoded {
    let encoding = Encoding::for_label(charset.trim().as_bytes()).unwrap_or_else(|| {
        warn!(charset, "unknown charset label, decoding as utf-8");
        UTF_8
    });
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(charset = %label(used), "undecodable bytes replaced");
    }
    Decoded {
        text: text.into_owned(),
        charset: label(used),
        had_errors,
    }
}

/// Detect and decode, falling back to UTF-8 below `min_confidence`
#[must_use]
pub fn detect_and_decode(bytes: &[u8], detector: &dyn EncodingDetector, min_confidence: f32) -> Decoded {
    let detection = detector.detect(bytes);
    debug!(charset = %detection.charset, confidence = detection.confidence, "detected charset");
    if detection.confidence < min_confidence {
        debug!(min_confidence, "low detection confidence, using utf-8");
        return decode(bytes, "utf-8");
    }
    decode(bytes, &detection.charset)
}

fn label(encoding: &'static Encoding) -> String {
    encoding.name().to_ascii_lowercase()
}
