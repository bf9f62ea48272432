use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Current choice for a selection-only field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Single(Option<String>),
    Multi(BTreeSet<String>),
}

impl Selection {
    pub fn is_made(&self) -> bool {
        match self {
            Selection::Single(choice) => choice.is_some(),
            Selection::Multi(choices) => !choices.is_empty(),
        }
    }

    pub fn contains(&self, option: &str) -> bool {
        match self {
            Selection::Single(choice) => choice.as_deref() == Some(option),
            Selection::Multi(choices) => choices.contains(option),
        }
    }
}

pub type Selections = BTreeMap<String, Selection>;
