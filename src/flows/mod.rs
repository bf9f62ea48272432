//! Concrete wizard schemas for the app's onboarding and creation screens.

pub mod create_event;
pub mod personal_info;
pub mod signup;

use wizard_config::ValidationConfig;

use crate::validation::AgeRange;

fn age_range(config: &ValidationConfig) -> AgeRange {
    AgeRange {
        min: config.min_age,
        max: config.max_age,
    }
}

fn owned(options: &[&str]) -> Vec<String> {
    options.iter().map(|option| option.to_string()).collect()
}
