//! Validation reporter
//!
//! Summarizes the findings installed on a collection's messages.

use crate::Result;
use hl7_ir::{MessageCollection, ValidationLevel, ValidationResult};
use serde::Serialize;
use std::fmt;

/// Findings of one message in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSummary {
    /// 0-based position in the collection
    pub index: usize,
    pub message_type: String,
    pub control_id: String,
    pub valid: bool,
    pub findings: Vec<ValidationResult>,
}

/// Summary over a validated collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub message_count: usize,
    pub valid_count: usize,
    pub info_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
    pub critical_count: usize,
    pub messages: Vec<MessageSummary>,
}

impl ValidationReport {
    /// Summarize the findings currently installed on each message
    #[must_use]
    pub fn from_collection(collection: &MessageCollection) -> Self {
        let mut report = Self::default();
        for (index, message) in collection.iter().enumerate() {
            for finding in message.findings() {
                *report.count_mut(finding.level) += 1;
            }
            let valid = message.is_valid();
            report.valid_count += usize::from(valid);
            report.messages.push(MessageSummary {
                index,
                message_type: message.message_type(),
                control_id: message.control_id().to_string(),
                valid,
                findings: message.findings().to_vec(),
            });
        }
        report.message_count = report.messages.len();
        report
    }

    /// Number of findings at a level
    #[must_use]
    pub fn count(&self, level: ValidationLevel) -> usize {
        match level {
            ValidationLevel::Info => self.info_count,
            ValidationLevel::Warning => self.warning_count,
            ValidationLevel::Error => self.error_count,
            ValidationLevel::Critical => self.critical_count,
        }
    }

    fn count_mut(&mut self, level: ValidationLevel) -> &mut usize {
        match level {
            ValidationLevel::Info => &mut self.info_count,
            ValidationLevel::Warning => &mut self.warning_count,
            ValidationLevel::Error => &mut self.error_count,
            ValidationLevel::Critical => &mut self.critical_count,
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count + self.critical_count > 0
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Render as JSON
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialize`] if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for summary in &self.messages {
            let label = if summary.message_type.is_empty() {
                "(unknown type)"
            } else {
                summary.message_type.as_str()
            };
            writeln!(
                f,
                "Message {} {label} [{}]: {}",
                summary.index + 1,
                summary.control_id,
                if summary.valid { "valid" } else { "invalid" }
            )?;
            for finding in &summary.findings {
                writeln!(f, "  {finding}")?;
            }
        }
        write!(
            f,
            "Validation summary: messages={}, valid={}, errors={}, warnings={}",
            self.message_count,
            self.valid_count,
            self.error_count + self.critical_count,
            self.warning_count
        )
    }
}
