#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # hl7-parser
//!
//! HL7 v2 tokenizer, message splitter and serializer.
//!
//! Text goes through [`split_messages`] to find message boundaries, then
//! each span is tokenized into an [`hl7_ir::Message`]. The [`Hl7Parser`]
//! facade ties both together and never fails on a single bad span: it
//! yields a degenerate message carrying a parse finding instead.

pub mod parser;
pub mod serializer;
pub mod splitter;
pub mod strategy;
pub mod tokenizer;

pub use parser::Hl7Parser;
pub use serializer::{Hl7Serializer, SegmentTerminator};
pub use splitter::split_messages;
pub use strategy::{ParserConfig, TokenizerStrategy};
pub use tokenizer::{BuiltinTokenizer, tokenize};

use thiserror::Error;

/// Errors that can occur when tokenizing HL7
#[derive(Error, Debug)]
pub enum Error {
    #[error("No records in input")]
    EmptyInput,

    #[error("Tokenize error at line {line}: {message}")]
    Tokenize { line: usize, message: String },

    #[error("Strategy {strategy} failed: {message}")]
    Strategy { strategy: String, message: String },
}

impl Error {
    /// Build a tokenize error for a 1-based record line.
    pub fn tokenize(line: usize, message: impl Into<String>) -> Self {
        Self::Tokenize {
            line,
            message: message.into(),
        }
    }

    /// Build a strategy error.
    pub fn strategy(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Strategy {
            strategy: strategy.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
