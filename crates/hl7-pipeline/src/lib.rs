#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # hl7-pipeline
//!
//! Decoding, loading and parallel batch processing of HL7 files.
//!
//! Bytes are decoded with a charset chosen by an [`EncodingDetector`], parsed
//! into a [`hl7_ir::MessageCollection`] and optionally validated. The
//! [`BatchProcessor`] spreads parsing and validation over a fixed-size thread
//! pool while keeping input order.

pub mod batch;
pub mod encoding;
pub mod loader;

pub use batch::{BatchConfig, BatchProcessor};
pub use encoding::{BomSniffer, Decoded, Detection, EncodingDetector, decode, detect_and_decode};
pub use loader::CollectionLoader;

use thiserror::Error;

/// Errors that can occur in the pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },

    #[error("Worker pool error: {0}")]
    Pool(String),

    #[error(transparent)]
    Parse(#[from] hl7_parser::Error),
}

impl Error {
    /// Create a structured I/O error with operation/path context.
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("io", "<unknown>", e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_context() {
        let error = Error::io("read", "/tmp/input.hl7", "permission denied");
        assert_eq!(
            error.to_string(),
            "IO error during read for '/tmp/input.hl7': permission denied"
        );
    }

    #[test]
    fn test_io_error_from_std_has_fallback_context() {
        let error = std::fs::File::open("/path/that/does/not/exist")
            .map_err(Error::from)
            .expect_err("open should fail");

        match error {
            Error::Io {
                operation, path, ..
            } => {
                assert_eq!(operation, "io");
                assert_eq!(path, "<unknown>");
            }
            other => panic!("expected io variant, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_converts() {
        let error: Error = hl7_parser::Error::EmptyInput.into();
        assert!(matches!(error, Error::Parse(_)));
    }
}
