//! Field, component and subcomponent types
//!
//! Positions are 1-based throughout, matching HL7 addressing (`PID.5.1.2`).

use crate::separators::SeparatorSet;
use serde::{Deserialize, Serialize};

/// Atomic string value, the leaf of the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcomponent {
    /// Raw text, escape sequences left untouched
    pub value: String,

    /// Ordinal position within the component (1-based)
    pub position: usize,
}

/// Ordered sequence of subcomponents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Subcomponents in encoding order
    pub subcomponents: Vec<Subcomponent>,

    /// Ordinal position within the field occurrence (1-based)
    pub position: usize,
}

/// One `~`-delimited occurrence of a repeated field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repetition {
    /// Components of this occurrence
    pub components: Vec<Component>,
}

/// Content of a field: one occurrence, or several repetitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Single occurrence
    Single(Vec<Component>),

    /// Two or more repetitions
    Repeated(Vec<Repetition>),
}

/// Schema metadata attached to a field by the schema registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Display name (e.g., "Patient Name")
    pub name: String,

    /// Data type tag (e.g., "XPN")
    pub data_type: String,

    /// Whether the field is required
    pub required: bool,

    /// Maximum length, if defined
    pub max_length: Option<usize>,
}

/// A segment field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Logical position within the segment (1-based)
    pub position: usize,

    /// Field content
    pub value: FieldValue,

    /// Schema metadata, filled lazily by the registry
    pub meta: Option<FieldMeta>,
}

impl Subcomponent {
    /// Create a subcomponent
    pub fn new(value: impl Into<String>, position: usize) -> Self {
        Self {
            value: value.into(),
            position,
        }
    }

    /// Whether the value is blank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Display for Subcomponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl Component {
    /// Create an empty component
    #[must_use]
    pub fn new(position: usize) -> Self {
        Self {
            subcomponents: Vec::new(),
            position,
        }
    }

    /// Create a component holding a single subcomponent
    pub fn scalar(value: impl Into<String>, position: usize) -> Self {
        Self {
            subcomponents: vec![Subcomponent::new(value, 1)],
            position,
        }
    }

    /// Split `text` on the subcomponent separator.
    ///
    /// Text without a subcomponent separator yields one subcomponent holding
    /// the whole text.
    #[must_use]
    pub fn parse(text: &str, position: usize, separators: &SeparatorSet) -> Self {
        let subcomponents = text
            .split(separators.subcomponent)
            .enumerate()
            .map(|(i, value)| Subcomponent::new(value, i + 1))
            .collect();

        Self {
            subcomponents,
            position,
        }
    }

    /// Value of the first subcomponent, or "" when there is none
    #[must_use]
    pub fn value(&self) -> &str {
        self.subcomponents.first().map_or("", |s| s.value.as_str())
    }

    /// Get a subcomponent by position (1-based)
    #[must_use]
    pub fn subcomponent(&self, position: usize) -> Option<&Subcomponent> {
        position
            .checked_sub(1)
            .and_then(|index| self.subcomponents.get(index))
    }

    /// Set a subcomponent by position (1-based), extending the list if needed.
    /// Position 0 is ignored.
    pub fn set_subcomponent(&mut self, position: usize, value: impl Into<String>) {
        if position == 0 {
            return;
        }
        while self.subcomponents.len() < position {
            let next = self.subcomponents.len() + 1;
            self.subcomponents.push(Subcomponent::new("", next));
        }
        self.subcomponents[position - 1].value = value.into();
    }

    /// Whether every subcomponent is blank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subcomponents.iter().all(Subcomponent::is_empty)
    }

    /// Encode back to wire text
    #[must_use]
    pub fn encode(&self, separators: &SeparatorSet) -> String {
        join(
            self.subcomponents.iter().map(|s| s.value.as_str()),
            separators.subcomponent,
        )
    }
}

impl Repetition {
    /// Create a repetition from its components
    #[must_use]
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }
}

impl Field {
    /// Create an empty field
    #[must_use]
    pub fn new(position: usize) -> Self {
        Self {
            position,
            value: FieldValue::Single(Vec::new()),
            meta: None,
        }
    }

    /// Create a single-occurrence field from components
    #[must_use]
    pub fn from_components(position: usize, components: Vec<Component>) -> Self {
        Self {
            position,
            value: FieldValue::Single(components),
            meta: None,
        }
    }

    /// Create a repeated field from its repetitions
    #[must_use]
    pub fn from_repetitions(position: usize, repetitions: Vec<Repetition>) -> Self {
        Self {
            position,
            value: FieldValue::Repeated(repetitions),
            meta: None,
        }
    }

    /// Create a field holding one literal value, taken verbatim
    pub fn scalar(position: usize, value: impl Into<String>) -> Self {
        Self::from_components(position, vec![Component::scalar(value, 1)])
    }

    /// Whether the field carries repetitions
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        matches!(self.value, FieldValue::Repeated(_))
    }

    /// Number of occurrences (1 for a single-occurrence field)
    #[must_use]
    pub fn repetition_count(&self) -> usize {
        match &self.value {
            FieldValue::Single(_) => 1,
            FieldValue::Repeated(reps) => reps.len(),
        }
    }

    /// Components of the occurrence at `index` (0-based)
    #[must_use]
    pub fn repetition(&self, index: usize) -> Option<&[Component]> {
        match &self.value {
            FieldValue::Single(components) if index == 0 => Some(components.as_slice()),
            FieldValue::Single(_) => None,
            FieldValue::Repeated(reps) => reps.get(index).map(|r| r.components.as_slice()),
        }
    }

    /// Components of the first occurrence
    #[must_use]
    pub fn components(&self) -> &[Component] {
        self.repetition(0).unwrap_or(&[])
    }

    /// Get a component of the first occurrence by position (1-based)
    #[must_use]
    pub fn component(&self, position: usize) -> Option<&Component> {
        position
            .checked_sub(1)
            .and_then(|index| self.components().get(index))
    }

    /// Scalar value: first subcomponent of the first component of the first
    /// occurrence, or "" when the field is empty
    #[must_use]
    pub fn value(&self) -> &str {
        self.components().first().map_or("", Component::value)
    }

    /// Set the scalar value, creating the first component and subcomponent if
    /// needed. Other components are left untouched.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let components = self.first_occurrence_mut();
        if components.is_empty() {
            components.push(Component::new(1));
        }
        components[0].set_subcomponent(1, value);
    }

    /// Replace a component of the first occurrence (1-based), splitting `text`
    /// on the subcomponent separator. Position 0 is ignored.
    pub fn set_component(&mut self, position: usize, text: &str, separators: &SeparatorSet) {
        if position == 0 {
            return;
        }
        let components = self.first_occurrence_mut();
        while components.len() < position {
            let next = components.len() + 1;
            components.push(Component::new(next));
        }
        components[position - 1] = Component::parse(text, position, separators);
    }

    /// Whether every subcomponent of every occurrence is blank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.value {
            FieldValue::Single(components) => components.iter().all(Component::is_empty),
            FieldValue::Repeated(reps) => reps
                .iter()
                .all(|r| r.components.iter().all(Component::is_empty)),
        }
    }

    /// Encode back to wire text
    #[must_use]
    pub fn encode(&self, separators: &SeparatorSet) -> String {
        match &self.value {
            FieldValue::Single(components) => encode_components(components, separators),
            FieldValue::Repeated(reps) => {
                let encoded: Vec<String> = reps
                    .iter()
                    .map(|r| encode_components(&r.components, separators))
                    .collect();
                join(encoded.iter().map(String::as_str), separators.repetition)
            }
        }
    }

    fn first_occurrence_mut(&mut self) -> &mut Vec<Component> {
        match &mut self.value {
            FieldValue::Single(components) => components,
            FieldValue::Repeated(reps) => {
                if reps.is_empty() {
                    reps.push(Repetition::new(Vec::new()));
                }
                &mut reps[0].components
            }
        }
    }
}

/// Encode a component list with the component separator
#[must_use]
pub fn encode_components(components: &[Component], separators: &SeparatorSet) -> String {
    let encoded: Vec<String> = components.iter().map(|c| c.encode(separators)).collect();
    join(encoded.iter().map(String::as_str), separators.component)
}

fn join<'a>(parts: impl Iterator<Item = &'a str>, separator: char) -> String {
    let mut out = String::new();
    for (i, part) in parts.enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push_str(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seps() -> SeparatorSet {
        SeparatorSet::default()
    }

    #[test]
    fn test_subcomponent() {
        let sub = Subcomponent::new("test_value", 1);
        assert_eq!(sub.to_string(), "test_value");
        assert!(!sub.is_empty());
        assert!(Subcomponent::new("  ", 1).is_empty());
    }

    #[test]
    fn test_component_parse_and_encode() {
        let comp = Component::parse("value1&value2", 1, &seps());
        assert_eq!(comp.subcomponents.len(), 2);
        assert_eq!(comp.subcomponent(1).unwrap().value, "value1");
        assert_eq!(comp.subcomponent(2).unwrap().value, "value2");
        assert!(comp.subcomponent(3).is_none());
        assert!(comp.subcomponent(0).is_none());
        assert_eq!(comp.encode(&seps()), "value1&value2");
    }

    #[test]
    fn test_component_without_separator_is_scalar() {
        let comp = Component::parse("DOE", 1, &seps());
        assert_eq!(comp.subcomponents.len(), 1);
        assert_eq!(comp.value(), "DOE");
    }

    #[test]
    fn test_set_subcomponent_extends() {
        let mut comp = Component::new(1);
        comp.set_subcomponent(3, "c");
        assert_eq!(comp.subcomponents.len(), 3);
        assert_eq!(comp.encode(&seps()), "&&c");
        assert_eq!(comp.subcomponents[2].position, 3);
    }

    #[test]
    fn test_field_set_value() {
        let mut field = Field::new(1);
        assert!(field.is_empty());
        field.set_value("test_value");
        assert_eq!(field.value(), "test_value");
        assert!(!field.is_empty());
    }

    #[test]
    fn test_field_set_component() {
        let mut field = Field::new(5);
        field.set_component(1, "comp1&subcomp1", &seps());
        let comp = field.component(1).unwrap();
        assert_eq!(comp.subcomponents[0].value, "comp1");
        assert_eq!(comp.subcomponents[1].value, "subcomp1");

        field.set_component(3, "third", &seps());
        assert_eq!(field.encode(&seps()), "comp1&subcomp1^^third");
    }

    #[test]
    fn test_repeated_field_accessors() {
        let field = Field::from_repetitions(
            3,
            vec![
                Repetition::new(vec![Component::scalar("A", 1), Component::scalar("B", 2)]),
                Repetition::new(vec![Component::scalar("C", 1)]),
            ],
        );

        assert!(field.is_repeated());
        assert_eq!(field.repetition_count(), 2);
        assert_eq!(field.value(), "A");
        assert_eq!(field.repetition(1).unwrap()[0].value(), "C");
        assert!(field.repetition(2).is_none());
        assert_eq!(field.encode(&seps()), "A^B~C");
    }

    #[test]
    fn test_repeated_field_with_blank_first_occurrence_is_not_empty() {
        let field = Field::from_repetitions(
            3,
            vec![
                Repetition::new(vec![Component::scalar("", 1)]),
                Repetition::new(vec![Component::scalar("12345", 1)]),
            ],
        );
        assert!(!field.is_empty());
    }

    #[test]
    fn test_encode_with_custom_separators() {
        let custom = SeparatorSet {
            field: '|',
            component: '#',
            repetition: '$',
            escape: '%',
            subcomponent: '@',
        };
        let field = Field::from_repetitions(
            1,
            vec![
                Repetition::new(vec![Component::scalar("a", 1), Component::scalar("b", 2)]),
                Repetition::new(vec![Component::parse("c@d", 1, &custom)]),
            ],
        );
        assert_eq!(field.encode(&custom), "a#b$c@d");
    }

    #[test]
    fn test_field_serializes_to_json() {
        let field = Field::scalar(10, "12345");
        let json = serde_json::to_string(&field).unwrap();
        assert!(json.contains("\"position\":10"));
        assert!(json.contains("12345"));
    }
}
