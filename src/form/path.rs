use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a repeatable entry, minted when the entry is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a field: either top-level or inside one repeatable entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Field(String),
    Entry {
        section: String,
        entry: EntryId,
        field: String,
    },
}

impl FieldPath {
    pub fn field(key: impl Into<String>) -> Self {
        FieldPath::Field(key.into())
    }

    pub fn entry(section: impl Into<String>, entry: EntryId, field: impl Into<String>) -> Self {
        FieldPath::Entry {
            section: section.into(),
            entry,
            field: field.into(),
        }
    }

    pub fn field_key(&self) -> &str {
        match self {
            FieldPath::Field(key) => key,
            FieldPath::Entry { field, .. } => field,
        }
    }

    /// Path of a sibling field sharing this path's scope.
    pub fn sibling(&self, key: &str) -> Self {
        match self {
            FieldPath::Field(_) => FieldPath::Field(key.to_string()),
            FieldPath::Entry { section, entry, .. } => FieldPath::Entry {
                section: section.clone(),
                entry: *entry,
                field: key.to_string(),
            },
        }
    }

    /// Key used in the error map: `field` or `entry_id:field`.
    pub fn error_key(&self) -> String {
        match self {
            FieldPath::Field(key) => key.clone(),
            FieldPath::Entry { entry, field, .. } => format!("{entry}:{field}"),
        }
    }
}

impl From<&str> for FieldPath {
    fn from(key: &str) -> Self {
        FieldPath::Field(key.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(key: String) -> Self {
        FieldPath::Field(key)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Field(key) => f.write_str(key),
            FieldPath::Entry { section, .. } => write!(f, "{section}/{}", self.error_key()),
        }
    }
}
