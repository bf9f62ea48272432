use std::result::Result as StdResult;

use thiserror::Error;
use wizard_config::ConfigError;

/// Failures raised by wizard operations. Field validation problems are not
/// errors; they live in the error map.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Unknown section: {0}")]
    UnknownSection(String),
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    #[error("Unknown selection: {0}")]
    UnknownSelection(String),
    #[error("`{option}` is not an option for {selection}")]
    InvalidOption { selection: String, option: String },
    #[error("Section `{0}` must keep at least one entry")]
    LastEntry(String),
    #[error("Preferences error: {0}")]
    Preferences(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = StdResult<T, WizardError>;

impl From<dialoguer::Error> for WizardError {
    fn from(err: dialoguer::Error) -> Self {
        WizardError::Terminal(err.to_string())
    }
}
