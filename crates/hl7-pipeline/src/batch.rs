//! Parallel batch processing
//!
//! Message spans are parsed and validated on a fixed-size worker pool.
//! Results always come back in input order.

use crate::loader::{CollectionLoader, DEFAULT_MIN_CONFIDENCE};
use crate::{Error, Result};
use hl7_ir::{Message, MessageCollection};
use hl7_parser::{Hl7Parser, split_messages};
use hl7_schema::SchemaRegistry;
use hl7_validation::{ValidationConfig, ValidationEngine, ValidationReport};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for batch processing
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Worker threads (0 = one per CPU)
    pub workers: usize,
    /// Validate each message right after parsing
    pub validate: bool,
    /// Detections below this confidence decode as UTF-8
    pub min_confidence: f32,
    /// Skip detection and decode with this charset
    pub encoding: Option<String>,
    pub validation: ValidationConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            validate: true,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            encoding: None,
            validation: ValidationConfig::default(),
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    #[must_use]
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    #[must_use]
    pub fn validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }
}

/// Parses and validates message batches on a worker pool
pub struct BatchProcessor {
    config: BatchConfig,
    loader: CollectionLoader,
    engine: ValidationEngine,
    pool: ThreadPool,
}

impl BatchProcessor {
    /// Create a processor with its own worker pool
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pool`] when the worker pool cannot be started.
    pub fn new(config: BatchConfig, registry: Arc<SchemaRegistry>) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("hl7-worker-{i}"))
            .build()
            .map_err(|e| Error::Pool(e.to_string()))?;

        let mut loader = CollectionLoader::new().min_confidence(config.min_confidence);
        if let Some(label) = &config.encoding {
            loader = loader.encoding(label.clone());
        }
        let engine = ValidationEngine::with_config(registry, config.validation.clone());

        debug!(workers = pool.current_num_threads(), "started worker pool");
        Ok(Self {
            config,
            loader,
            engine,
            pool,
        })
    }

    /// Use a custom parser, e.g. one with extra tokenizer strategies
    #[must_use]
    pub fn with_parser(mut self, parser: Hl7Parser) -> Self {
        self.loader = self.loader.with_parser(parser);
        self
    }

    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    #[must_use]
    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Parse (and optionally validate) every message in a blob
    #[must_use]
    pub fn process_text(&self, text: &str) -> MessageCollection {
        let spans = split_messages(text);
        let parser = self.loader.parser();
        let messages: Vec<Message> = self.pool.install(|| {
            spans
                .par_iter()
                .filter_map(|span| parser.parse_span(span))
                .map(|mut message| {
                    if self.config.validate {
                        self.engine.validate(&mut message);
                    }
                    message
                })
                .collect()
        });
        info!(spans = spans.len(), messages = messages.len(), "processed batch");
        MessageCollection::from_messages(messages)
    }

    /// Read, decode and process a file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read.
    pub fn process_file(&self, path: &Path) -> Result<MessageCollection> {
        let (text, provenance) = self.loader.read_file(path)?;
        Ok(self.process_text(&text).with_provenance(provenance))
    }

    /// Parse and validate exactly one message.
    ///
    /// # Errors
    ///
    /// Unlike batch processing, a failure of every tokenizer strategy is
    /// returned as [`Error::Parse`] instead of a degenerate message.
    pub fn process_message(&self, text: &str) -> Result<Option<Message>> {
        let Some(mut message) = self.loader.parser().parse_message(text)? else {
            return Ok(None);
        };
        if self.config.validate {
            self.engine.validate(&mut message);
        }
        Ok(Some(message))
    }

    /// Validate every message of a collection on the pool and summarize
    pub fn validate_collection(&self, collection: &mut MessageCollection) -> ValidationReport {
        self.pool.install(|| {
            collection.messages_mut().par_iter_mut().for_each(|message| {
                self.engine.validate(message);
            });
        });
        ValidationReport::from_collection(collection)
    }
}

impl fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("config", &self.config)
            .field("workers", &self.workers())
            .finish_non_exhaustive()
    }
}
