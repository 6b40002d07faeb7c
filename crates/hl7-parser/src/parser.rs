//! Parser facade
//!
//! Splits input into message spans and tokenizes each one, trying the
//! configured strategies before the built-in tokenizer. One bad span never
//! aborts the batch.

use crate::splitter::split_messages;
use crate::strategy::{ParserConfig, TokenizerStrategy};
use crate::tokenizer::BuiltinTokenizer;
use crate::{Error, Result};
use hl7_ir::{FindingKind, Location, Message, MessageCollection, ValidationResult};
use tracing::{debug, error, info};

/// Parser for HL7 v2 text
#[derive(Debug, Clone, Default)]
pub struct Hl7Parser {
    config: ParserConfig,
}

impl Hl7Parser {
    /// Create a parser that only uses the built-in tokenizer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with extra strategies
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the text of a single message.
    ///
    /// Whitespace-only text gives `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the built-in tokenizer's error when every strategy fails.
    pub fn parse_message(&self, text: &str) -> Result<Option<Message>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        for strategy in self.config.strategies() {
            match strategy.tokenize(text) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => debug!(strategy = strategy.name(), error = %e, "strategy failed, trying next"),
            }
        }

        BuiltinTokenizer.tokenize(text).map(Some)
    }

    /// Parse one span, turning a failure into a degenerate message that
    /// carries a parse finding.
    #[must_use]
    pub fn parse_span(&self, span: &str) -> Option<Message> {
        match self.parse_message(span) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, "failed to parse message span");
                Some(degenerate(span, &e))
            }
        }
    }

    /// Parse every message in a blob, in input order
    #[must_use]
    pub fn parse_batch(&self, text: &str) -> Vec<Message> {
        split_messages(text)
            .into_iter()
            .filter_map(|span| self.parse_span(span))
            .collect()
    }

    /// Parse a blob into a collection
    #[must_use]
    pub fn parse_collection(&self, text: &str) -> MessageCollection {
        let collection = MessageCollection::from_messages(self.parse_batch(text));
        info!(messages = collection.len(), "parsed message collection");
        collection
    }
}

fn degenerate(span: &str, error: &Error) -> Message {
    Message::degenerate(
        span,
        ValidationResult::error(
            FindingKind::ParseFailure,
            format!("Parse error: {error}"),
            Location::Message,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Rejecting(Arc<AtomicUsize>);

    impl TokenizerStrategy for Rejecting {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        fn tokenize(&self, _text: &str) -> Result<Message> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(Error::strategy(self.name(), "not supported"))
        }
    }

    struct Fixed;

    impl TokenizerStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn tokenize(&self, _text: &str) -> Result<Message> {
            Ok(Message::default())
        }
    }

    #[test]
    fn test_parse_single_message() {
        let parser = Hl7Parser::new();
        let message = parser
            .parse_message("MSH|^~\\&|A||||||ADT^A01|1|P|2.5\rPID|1")
            .unwrap()
            .unwrap();
        assert_eq!(message.segment_count(), 2);
        assert_eq!(message.message_type(), "ADT^A01");
    }

    #[test]
    fn test_whitespace_is_no_message() {
        let parser = Hl7Parser::new();
        assert!(parser.parse_message("  \r\n").unwrap().is_none());
        assert!(parser.parse_batch("\n\n").is_empty());
    }

    #[test]
    fn test_strategies_in_order_then_builtin() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = ParserConfig::new().with_strategy(Rejecting(Arc::clone(&calls)));
        let parser = Hl7Parser::with_config(config);

        let message = parser.parse_message("MSH|^~\\&|A\rPID|1").unwrap().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(message.segment_count(), 2);
    }

    #[test]
    fn test_first_successful_strategy_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = ParserConfig::new()
            .with_strategy(Fixed)
            .with_strategy(Rejecting(Arc::clone(&calls)));
        let parser = Hl7Parser::with_config(config);

        let message = parser.parse_message("MSH|^~\\&|A\rPID|1").unwrap().unwrap();
        assert_eq!(message.segment_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_nameless_record_stays_in_its_message() {
        let parser = Hl7Parser::new();
        let messages = parser
            .parse_batch("MSH|^~\\&|A||||||ADT^A01|1|P|2.5\rPID|1||123||DOE\r|stray\rPV1|1|I\nMSH|^~\\&|B");
        assert_eq!(messages.len(), 2);

        let first = &messages[0];
        assert_eq!(first.segment_count(), 4);
        assert!(first.findings().is_empty());
        assert_eq!(first.segment(2).unwrap().name(), "");
        assert_eq!(first.segment_named("PV1").unwrap().line_number(), 4);
    }

    #[test]
    fn test_failure_becomes_degenerate_message() {
        let bad = degenerate("MSH|^~\\&|B\r|broken", &Error::tokenize(2, "bad record"));
        assert_eq!(bad.segment_count(), 0);
        assert_eq!(bad.raw(), Some("MSH|^~\\&|B\r|broken"));
        assert_eq!(bad.findings().len(), 1);
        assert_eq!(bad.findings()[0].kind, FindingKind::ParseFailure);
        assert_eq!(
            bad.findings()[0].message,
            "Parse error: Tokenize error at line 2: bad record"
        );
    }

    #[test]
    fn test_collection_keeps_input_order() {
        let parser = Hl7Parser::new();
        let collection = parser.parse_collection(
            "MSH|^~\\&|A||||||ADT^A01|1|P|2.5\rPID|1\rMSH|^~\\&|B||||||ORU^R01|2|P|2.5\rOBX|1",
        );
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(0).unwrap().control_id(), "1");
        assert_eq!(collection.get(1).unwrap().control_id(), "2");
    }

    #[test]
    fn test_config_debug_lists_strategy_names() {
        let config = ParserConfig::new().with_strategy(Fixed);
        assert!(format!("{config:?}").contains("fixed"));
    }
}
