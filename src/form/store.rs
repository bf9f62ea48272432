use std::collections::BTreeMap;

use crate::errors::{Result, WizardError};

use super::{EntryId, FieldPath, FieldValue};

/// Values visible to validators of one field: the top-level fields or the
/// fields of a single entry.
pub type Scope = BTreeMap<String, FieldValue>;

static EMPTY: FieldValue = FieldValue::Empty;

/// One record inside a repeatable section.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub fields: Scope,
}

impl Entry {
    pub fn new() -> Self {
        Self {
            id: EntryId::new(),
            fields: Scope::new(),
        }
    }

    pub fn get(&self, key: &str) -> &FieldValue {
        self.fields.get(key).unwrap_or(&EMPTY)
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

/// Current value of every field in a wizard instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStore {
    fields: Scope,
    sections: BTreeMap<String, Vec<Entry>>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a section with its single initial entry.
    pub fn ensure_section(&mut self, section: &str) {
        self.sections
            .entry(section.to_string())
            .or_insert_with(|| vec![Entry::new()]);
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldValue> {
        match path {
            FieldPath::Field(key) => Some(self.fields.get(key).unwrap_or(&EMPTY)),
            FieldPath::Entry { section, entry, field } => self
                .entry(section, *entry)
                .map(|entry| entry.get(field)),
        }
    }

    /// Overwrites the value at `path`. Fails only when the entry is gone.
    pub fn set(&mut self, path: &FieldPath, value: FieldValue) -> Result<()> {
        match path {
            FieldPath::Field(key) => {
                self.fields.insert(key.clone(), value);
                Ok(())
            }
            FieldPath::Entry { section, entry, field } => {
                let target = self
                    .sections
                    .get_mut(section)
                    .ok_or_else(|| WizardError::UnknownSection(section.clone()))?
                    .iter_mut()
                    .find(|candidate| candidate.id == *entry)
                    .ok_or_else(|| WizardError::EntryNotFound(entry.to_string()))?;
                target.fields.insert(field.clone(), value);
                Ok(())
            }
        }
    }

    pub fn scope(&self, path: &FieldPath) -> Option<&Scope> {
        match path {
            FieldPath::Field(_) => Some(&self.fields),
            FieldPath::Entry { section, entry, .. } => {
                self.entry(section, *entry).map(|entry| &entry.fields)
            }
        }
    }

    pub fn fields(&self) -> &Scope {
        &self.fields
    }

    pub fn entries(&self, section: &str) -> &[Entry] {
        self.sections
            .get(section)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn entry(&self, section: &str, entry: EntryId) -> Option<&Entry> {
        self.entries(section)
            .iter()
            .find(|candidate| candidate.id == entry)
    }

    pub fn add_entry(&mut self, section: &str) -> Result<EntryId> {
        let entries = self
            .sections
            .get_mut(section)
            .ok_or_else(|| WizardError::UnknownSection(section.to_string()))?;
        let entry = Entry::new();
        let id = entry.id;
        entries.push(entry);
        Ok(id)
    }

    /// Removes an entry, refusing to leave the section empty.
    pub fn remove_entry(&mut self, section: &str, entry: EntryId) -> Result<()> {
        let entries = self
            .sections
            .get_mut(section)
            .ok_or_else(|| WizardError::UnknownSection(section.to_string()))?;
        let position = entries
            .iter()
            .position(|candidate| candidate.id == entry)
            .ok_or_else(|| WizardError::EntryNotFound(entry.to_string()))?;
        if entries.len() <= 1 {
            return Err(WizardError::LastEntry(section.to_string()));
        }
        entries.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_written_value() {
        let mut store = FieldStore::new();
        let path = FieldPath::from("name");
        store.set(&path, FieldValue::from("  Ana  ")).unwrap();
        assert_eq!(store.get(&path), Some(&FieldValue::from("  Ana  ")));
    }

    #[test]
    fn unknown_top_level_field_reads_as_empty() {
        let store = FieldStore::new();
        assert_eq!(store.get(&FieldPath::from("missing")), Some(&FieldValue::Empty));
    }

    #[test]
    fn sections_start_with_one_entry_and_keep_it() {
        let mut store = FieldStore::new();
        store.ensure_section("education");
        let first = store.entries("education")[0].id;

        let err = store.remove_entry("education", first).unwrap_err();
        assert!(matches!(err, WizardError::LastEntry(_)));

        let second = store.add_entry("education").unwrap();
        store.remove_entry("education", first).unwrap();
        assert_eq!(store.entries("education").len(), 1);
        assert_eq!(store.entries("education")[0].id, second);
    }

    #[test]
    fn writing_into_removed_entry_fails() {
        let mut store = FieldStore::new();
        store.ensure_section("roles");
        let first = store.entries("roles")[0].id;
        let second = store.add_entry("roles").unwrap();
        store.remove_entry("roles", second).unwrap();

        let path = FieldPath::entry("roles", second, "title");
        assert!(matches!(
            store.set(&path, FieldValue::from("Engineer")),
            Err(WizardError::EntryNotFound(_))
        ));
        assert!(store
            .set(&FieldPath::entry("roles", first, "title"), "Engineer".into())
            .is_ok());
    }
}
