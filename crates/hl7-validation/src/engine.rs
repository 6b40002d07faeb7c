//! Validation engine

use crate::passes::{self, PassKind, ValidationPass};
use crate::reporter::ValidationReport;
use hl7_ir::{FindingKind, Message, MessageCollection, ValidationResult};
use hl7_schema::SchemaRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub structure: bool,
    pub segments: bool,
    pub fields: bool,
    pub data_types: bool,
    pub tables: bool,
    /// Maximum findings kept per message (0 = unlimited)
    pub max_findings: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            structure: true,
            segments: true,
            fields: true,
            data_types: true,
            tables: true,
            max_findings: 0,
        }
    }
}

impl ValidationConfig {
    /// Enable or disable one pass
    #[must_use]
    pub fn pass(mut self, kind: PassKind, enabled: bool) -> Self {
        *self.flag_mut(kind) = enabled;
        self
    }

    #[must_use]
    pub fn max_findings(mut self, max_findings: usize) -> Self {
        self.max_findings = max_findings;
        self
    }

    #[must_use]
    pub fn is_enabled(&self, kind: PassKind) -> bool {
        match kind {
            PassKind::Structure => self.structure,
            PassKind::Segment => self.segments,
            PassKind::Field => self.fields,
            PassKind::DataType => self.data_types,
            PassKind::Table => self.tables,
        }
    }

    fn flag_mut(&mut self, kind: PassKind) -> &mut bool {
        match kind {
            PassKind::Structure => &mut self.structure,
            PassKind::Segment => &mut self.segments,
            PassKind::Field => &mut self.fields,
            PassKind::DataType => &mut self.data_types,
            PassKind::Table => &mut self.tables,
        }
    }
}

/// Main validation engine
///
/// Runs the enabled passes in order against a shared, read-only registry.
/// The engine holds no mutable state, so one instance can validate
/// messages from several threads at once.
pub struct ValidationEngine {
    registry: Arc<SchemaRegistry>,
    config: ValidationConfig,
    passes: Vec<(PassKind, Box<dyn ValidationPass>)>,
}

impl ValidationEngine {
    /// Create an engine running every built-in pass
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, ValidationConfig::default())
    }

    /// Create with specific configuration
    #[must_use]
    pub fn with_config(registry: Arc<SchemaRegistry>, config: ValidationConfig) -> Self {
        let passes = PassKind::ALL
            .into_iter()
            .map(|kind| (kind, passes::builtin(kind)))
            .collect();
        Self {
            registry,
            config,
            passes,
        }
    }

    /// Replace the built-in pass of a kind, keeping its place in the order
    #[must_use]
    pub fn with_pass(mut self, kind: PassKind, pass: impl ValidationPass + 'static) -> Self {
        if let Some(slot) = self.passes.iter_mut().find(|(k, _)| *k == kind) {
            slot.1 = Box::new(pass);
        }
        self
    }

    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Compute findings for a message without installing them.
    ///
    /// Parse-failure findings already on the message are carried over ahead
    /// of the pass findings.
    #[must_use]
    pub fn check(&self, message: &Message) -> Vec<ValidationResult> {
        let mut findings: Vec<ValidationResult> = message
            .findings()
            .iter()
            .filter(|f| f.kind == FindingKind::ParseFailure)
            .cloned()
            .collect();

        for (kind, pass) in &self.passes {
            if !self.config.is_enabled(*kind) {
                continue;
            }
            let before = findings.len();
            pass.check(message, &self.registry, &mut findings);
            trace!(pass = pass.name(), findings = findings.len() - before, "pass complete");
        }

        if self.config.max_findings > 0 {
            findings.truncate(self.config.max_findings);
        }
        findings
    }

    /// Validate a message, replacing its findings
    pub fn validate<'m>(&self, message: &'m mut Message) -> &'m [ValidationResult] {
        let findings = self.check(message);
        debug!(
            message_type = %message.message_type(),
            findings = findings.len(),
            "validated message"
        );
        message.set_findings(findings);
        message.findings()
    }

    /// Validate every message of a collection and summarize
    pub fn validate_collection(&self, collection: &mut MessageCollection) -> ValidationReport {
        for message in collection.iter_mut() {
            self.validate(message);
        }
        ValidationReport::from_collection(collection)
    }
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.passes.iter().map(|(_, p)| p.name()).collect();
        f.debug_struct("ValidationEngine")
            .field("config", &self.config)
            .field("passes", &names)
            .finish_non_exhaustive()
    }
}
