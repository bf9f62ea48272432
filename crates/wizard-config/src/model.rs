use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Upper bound accepted for `max_age`.
pub const MAX_AGE_LIMIT: u32 = 150;

/// Stores the tunable constraints and preferences consumed by wizard flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    pub fn default_ui_color_enabled() -> bool {
        true
    }
}

/// Field constraints. Name minimums are intentionally separate per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub person_name_min: usize,
    pub host_name_min: usize,
    pub event_name_min: usize,
    pub mobile_digits: usize,
    pub password: PasswordPolicy,
    pub min_age: u32,
    pub max_age: u32,
    pub year_min: i32,
    pub description_max: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            person_name_min: 2,
            host_name_min: 2,
            event_name_min: 3,
            mobile_digits: 10,
            password: PasswordPolicy::default(),
            min_age: 13,
            max_age: 120,
            year_min: 1950,
            description_max: 500,
        }
    }
}

impl ValidationConfig {
    /// Rejects combinations no input could ever satisfy.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.min_age > self.max_age {
            return Err(ConfigError::Invalid(format!(
                "min_age {} exceeds max_age {}",
                self.min_age, self.max_age
            )));
        }
        if self.max_age > MAX_AGE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_age {} exceeds {MAX_AGE_LIMIT}",
                self.max_age
            )));
        }
        if self.mobile_digits == 0 {
            return Err(ConfigError::Invalid("mobile_digits must be positive".into()));
        }
        if self.year_min < 1000 || self.year_min > 9999 {
            return Err(ConfigError::Invalid(format!(
                "year_min {} is not a four digit year",
                self.year_min
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special_char: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            require_special_char: true,
        }
    }
}
