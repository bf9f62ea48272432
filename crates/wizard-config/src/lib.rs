//! wizard-config
//!
//! Validation constraints and user-facing settings for the wizard flows.
//! Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, PasswordPolicy, ValidationConfig, MAX_AGE_LIMIT};
