use std::collections::BTreeMap;

use serde::Serialize;

use super::EntryId;

/// Last known validation message per field key. A key with a non-empty
/// message is failing; a missing key is valid or not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorMap {
    entries: BTreeMap<String, String>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `message`, or clears the key when it is absent or empty.
    pub fn set(&mut self, key: impl Into<String>, message: Option<String>) {
        let key = key.into();
        match message {
            Some(message) if !message.is_empty() => {
                self.entries.insert(key, message);
            }
            _ => {
                self.entries.remove(&key);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn has_error(&self, key: &str) -> bool {
        self.get(key).is_some_and(|message| !message.is_empty())
    }

    pub fn clear(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops every key scoped to `entry`.
    pub fn clear_entry(&mut self, entry: EntryId) {
        let prefix = format!("{entry}:");
        self.entries.retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, message)| (key.as_str(), message.as_str()))
    }
}
