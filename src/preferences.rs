//! Injected storage for remembered selections (last used category and the
//! like). The controller never touches ambient global state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::errors::{Result, WizardError};
use crate::form::Selection;

pub type StoredSelections = BTreeMap<String, Selection>;

/// Abstraction over whatever key-value backend the host app provides.
pub trait PreferencesRepository: Send + Sync {
    fn load(&self, scope: &str) -> Result<Option<StoredSelections>>;
    fn save(&self, scope: &str, selections: &StoredSelections) -> Result<()>;
}

/// Process-local repository, used by tests and hosts without storage.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    scopes: Mutex<HashMap<String, StoredSelections>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferencesRepository for InMemoryPreferences {
    fn load(&self, scope: &str) -> Result<Option<StoredSelections>> {
        let scopes = self
            .scopes
            .lock()
            .map_err(|err| WizardError::Preferences(err.to_string()))?;
        Ok(scopes.get(scope).cloned())
    }

    fn save(&self, scope: &str, selections: &StoredSelections) -> Result<()> {
        let mut scopes = self
            .scopes
            .lock()
            .map_err(|err| WizardError::Preferences(err.to_string()))?;
        scopes.insert(scope.to_string(), selections.clone());
        Ok(())
    }
}
