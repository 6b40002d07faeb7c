//! Delimiter alphabet declared by a message header
//!
//! Every HL7 v2 message declares its own delimiters in the first record:
//! the character after the 3-letter header code is the field separator and
//! the next four characters are the encoding characters (component,
//! repetition, escape, subcomponent, in that fixed order).

use serde::{Deserialize, Serialize};

/// Default field separator
pub const DEFAULT_FIELD_SEPARATOR: char = '|';
/// Default component separator
pub const DEFAULT_COMPONENT_SEPARATOR: char = '^';
/// Default repetition separator
pub const DEFAULT_REPETITION_SEPARATOR: char = '~';
/// Default escape character
pub const DEFAULT_ESCAPE_CHARACTER: char = '\\';
/// Default subcomponent separator
pub const DEFAULT_SUBCOMPONENT_SEPARATOR: char = '&';

/// Segment codes whose first record declares the delimiter set.
pub const HEADER_SEGMENTS: [&str; 3] = ["MSH", "FHS", "BHS"];

/// Segment code of the message header.
pub const MESSAGE_HEADER: &str = "MSH";

/// Minimum header record length (in characters) needed to read the encoding block.
pub const MIN_HEADER_LENGTH: usize = 8;

/// The five delimiter characters in effect for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeparatorSet {
    /// Field separator (default '|')
    pub field: char,
    /// Component separator (default '^')
    pub component: char,
    /// Repetition separator (default '~')
    pub repetition: char,
    /// Escape character (default '\'), declared but never interpreted
    pub escape: char,
    /// Subcomponent separator (default '&')
    pub subcomponent: char,
}

impl Default for SeparatorSet {
    fn default() -> Self {
        Self {
            field: DEFAULT_FIELD_SEPARATOR,
            component: DEFAULT_COMPONENT_SEPARATOR,
            repetition: DEFAULT_REPETITION_SEPARATOR,
            escape: DEFAULT_ESCAPE_CHARACTER,
            subcomponent: DEFAULT_SUBCOMPONENT_SEPARATOR,
        }
    }
}

impl SeparatorSet {
    /// Read the delimiters declared by a header record.
    ///
    /// Returns `None` when the record does not start with a header code or is
    /// shorter than [`MIN_HEADER_LENGTH`] characters. The resolved characters
    /// are not checked for duplicates or overlaps.
    ///
    /// ```
    /// use hl7_ir::SeparatorSet;
    ///
    /// let seps = SeparatorSet::from_header("MSH|#$%@|APP").unwrap();
    /// assert_eq!(seps.component, '#');
    /// assert_eq!(seps.subcomponent, '@');
    /// ```
    #[must_use]
    pub fn from_header(record: &str) -> Option<Self> {
        if !is_header_record(record) {
            return None;
        }

        let mut chars = record.chars().skip(3);
        let field = chars.next()?;
        let component = chars.next()?;
        let repetition = chars.next()?;
        let escape = chars.next()?;
        let subcomponent = chars.next()?;

        Some(Self {
            field,
            component,
            repetition,
            escape,
            subcomponent,
        })
    }

    /// Resolve delimiters from a header record, substituting the standard
    /// defaults when the record is absent, not a header, or too short.
    ///
    /// This is the named default-substitution path: a deficient header is not
    /// an error condition.
    #[must_use]
    pub fn resolve_or_default(record: Option<&str>) -> Self {
        record.and_then(Self::from_header).unwrap_or_default()
    }

    /// The 4-character encoding block as it appears in the header's second field.
    #[must_use]
    pub fn encoding_characters(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .collect()
    }
}

/// Whether a record starts with one of the [`HEADER_SEGMENTS`] codes and is
/// long enough to carry the encoding block.
#[must_use]
pub fn is_header_record(record: &str) -> bool {
    HEADER_SEGMENTS.iter().any(|code| record.starts_with(code))
        && record.chars().count() >= MIN_HEADER_LENGTH
}
