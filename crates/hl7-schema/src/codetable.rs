//! Code tables for coded field values

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An enumerated code to description mapping
///
/// Codes are stored upper-cased and matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTable {
    /// Table identifier (e.g. "0001")
    pub id: String,
    /// Display name
    pub name: String,
    codes: HashMap<String, String>,
}

impl CodeTable {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            codes: HashMap::new(),
        }
    }

    /// Add a code
    #[must_use]
    pub fn with_code(mut self, code: &str, description: impl Into<String>) -> Self {
        self.insert(code, description);
        self
    }

    /// Add several codes
    #[must_use]
    pub fn with_codes(mut self, codes: &[(&str, &str)]) -> Self {
        for (code, description) in codes {
            self.insert(code, *description);
        }
        self
    }

    pub fn insert(&mut self, code: &str, description: impl Into<String>) {
        self.codes.insert(code.to_uppercase(), description.into());
    }

    /// Description of a code, matched upper-cased
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.codes.get(&code.to_uppercase()).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains_key(&code.to_uppercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codes in sorted order
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.codes.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = CodeTable::new("0001", "Administrative Sex")
            .with_codes(&[("F", "Female"), ("M", "Male")]);
        assert_eq!(table.lookup("f"), Some("Female"));
        assert_eq!(table.lookup("M"), Some("Male"));
        assert_eq!(table.lookup("X"), None);
        assert!(table.contains("m"));
    }

    #[test]
    fn test_codes_are_stored_upper_cased() {
        let table = CodeTable::new("0078", "Abnormal Flags").with_code("null", "No range defined");
        assert_eq!(table.codes(), vec!["NULL"]);
        assert_eq!(table.lookup("Null"), Some("No range defined"));
        assert_eq!(table.len(), 1);
    }
}
