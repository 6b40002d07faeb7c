//! Interchangeable tokenizer strategies

use crate::Result;
use hl7_ir::Message;
use std::fmt;
use std::sync::Arc;

/// One way of turning a message's text into a [`Message`]
///
/// Strategies are tried in the configured order; the first success wins and
/// the built-in tokenizer is always tried last.
pub trait TokenizerStrategy: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Tokenize one message's text. Each call builds a fresh message.
    ///
    /// # Errors
    ///
    /// Returns an error when this strategy cannot handle the text; the
    /// parser then moves on to the next strategy.
    fn tokenize(&self, text: &str) -> Result<Message>;
}

/// Parser configuration
#[derive(Clone, Default)]
pub struct ParserConfig {
    strategies: Vec<Arc<dyn TokenizerStrategy>>,
}

impl ParserConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy to try before the built-in tokenizer
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl TokenizerStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Configured strategies in priority order
    #[must_use]
    pub fn strategies(&self) -> &[Arc<dyn TokenizerStrategy>] {
        &self.strategies
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("ParserConfig")
            .field("strategies", &names)
            .finish()
    }
}
