//! Ordered message collections with provenance

use crate::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a collection's text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Source file path
    pub path: Option<PathBuf>,

    /// Charset the bytes were decoded with
    pub encoding: String,

    /// Source modification time
    pub modified: Option<DateTime<Utc>>,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            path: None,
            encoding: "utf-8".to_string(),
            modified: None,
        }
    }
}

/// Messages in input order, owned exclusively by the collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCollection {
    messages: Vec<Message>,
    provenance: Provenance,
}

impl MessageCollection {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap parsed messages
    #[must_use]
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            provenance: Provenance::default(),
        }
    }

    /// Attach provenance
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Source provenance
    #[must_use]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Message> {
        self.messages.iter_mut()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Message> {
        self.messages.get_mut(index)
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove the message at `index`, or `None` when out of range
    pub fn remove(&mut self, index: usize) -> Option<Message> {
        (index < self.messages.len()).then(|| self.messages.remove(index))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Distinct message types, sorted, skipping messages without a type
    #[must_use]
    pub fn message_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .messages
            .iter()
            .map(Message::message_type)
            .filter(|t| !t.is_empty())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// Messages whose type equals `message_type` exactly
    #[must_use]
    pub fn filter_by_type(&self, message_type: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.message_type() == message_type)
            .collect()
    }

    /// Messages whose wire text contains `term`
    #[must_use]
    pub fn filter_by_content(&self, term: &str, case_sensitive: bool) -> Vec<&Message> {
        if case_sensitive {
            return self
                .messages
                .iter()
                .filter(|m| m.encode().contains(term))
                .collect();
        }
        let needle = term.to_lowercase();
        self.messages
            .iter()
            .filter(|m| m.encode().to_lowercase().contains(&needle))
            .collect()
    }
}

impl IntoIterator for MessageCollection {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageCollection {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl FromIterator<Message> for MessageCollection {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self::from_messages(iter.into_iter().collect())
    }
}
