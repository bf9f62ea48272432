//! Pure field validators.
//!
//! Every function here maps a raw value (plus optional constraints) to a
//! [`ValidationOutcome`]. Nothing is mutated and the clock is passed in, so a
//! stable input always produces the same outcome.

mod dates;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use wizard_config::PasswordPolicy;

pub use dates::{parse_date, parse_year, to_iso};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Result of running a validator against a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Runs `next` only when this outcome is still valid.
    pub fn and_then(self, next: impl FnOnce() -> ValidationOutcome) -> ValidationOutcome {
        if self.is_valid {
            next()
        } else {
            self
        }
    }
}

/// Name-like text with its own minimum length. Event name, host name and
/// person name each get an instance; they are not one shared rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRule {
    pub label: &'static str,
    pub min_len: usize,
}

impl NameRule {
    pub fn new(label: &'static str, min_len: usize) -> Self {
        Self { label, min_len }
    }

    pub fn validate(&self, value: &str) -> ValidationOutcome {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return ValidationOutcome::invalid(format!("{} is required", self.label));
        }
        if trimmed.chars().count() < self.min_len {
            return ValidationOutcome::invalid(format!(
                "{} is too short (minimum {} characters)",
                self.label, self.min_len
            ));
        }
        ValidationOutcome::valid()
    }
}

/// Inclusive age bounds for date-of-birth checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

/// Inclusive bounds for plain year fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

pub fn validate_required(value: &str, label: &str) -> ValidationOutcome {
    if value.trim().is_empty() {
        ValidationOutcome::invalid(format!("{label} is required"))
    } else {
        ValidationOutcome::valid()
    }
}

pub fn validate_email(value: &str) -> ValidationOutcome {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return ValidationOutcome::invalid("Email is required");
    }
    if EMAIL_PATTERN.is_match(trimmed) {
        ValidationOutcome::valid()
    } else {
        ValidationOutcome::invalid("Please enter a valid email address")
    }
}

/// Strips everything except ASCII digits.
pub fn clean_mobile(raw: &str) -> String {
    raw.chars().filter(|ch| ch.is_ascii_digit()).collect()
}

pub fn validate_mobile(raw: &str, digits: usize) -> ValidationOutcome {
    let cleaned = clean_mobile(raw);
    if cleaned.is_empty() {
        return ValidationOutcome::invalid("Mobile number is required");
    }
    if cleaned.len() != digits {
        return ValidationOutcome::invalid(format!("Mobile number must be {digits} digits"));
    }
    ValidationOutcome::valid()
}

pub fn validate_password(value: &str, policy: &PasswordPolicy) -> ValidationOutcome {
    if value.is_empty() {
        return ValidationOutcome::invalid("Password is required");
    }
    if value.chars().count() < policy.min_length {
        return ValidationOutcome::invalid(format!(
            "Password must be at least {} characters",
            policy.min_length
        ));
    }

    let mut missing = Vec::new();
    if policy.require_uppercase && !value.chars().any(char::is_uppercase) {
        missing.push("an uppercase letter");
    }
    if policy.require_lowercase && !value.chars().any(char::is_lowercase) {
        missing.push("a lowercase letter");
    }
    if policy.require_number && !value.chars().any(|ch| ch.is_ascii_digit()) {
        missing.push("a number");
    }
    if policy.require_special_char
        && !value
            .chars()
            .any(|ch| !ch.is_alphanumeric() && !ch.is_whitespace())
    {
        missing.push("a special character");
    }

    if missing.is_empty() {
        ValidationOutcome::valid()
    } else {
        ValidationOutcome::invalid(format!("Password must contain {}", missing.join(", ")))
    }
}

/// Whole years elapsed between `dob` and `today`.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

pub fn validate_date_of_birth(
    value: &str,
    range: AgeRange,
    today: NaiveDate,
) -> ValidationOutcome {
    if value.trim().is_empty() {
        return ValidationOutcome::invalid("Date of birth is required");
    }
    let Some(dob) = parse_date(value) else {
        return ValidationOutcome::invalid("Enter a valid date of birth (YYYY-MM-DD)");
    };
    let age = age_on(dob, today);
    if age < i32::try_from(range.min).unwrap_or(i32::MAX) {
        return ValidationOutcome::invalid(format!(
            "You must be at least {} years old",
            range.min
        ));
    }
    if age > i32::try_from(range.max).unwrap_or(i32::MAX) {
        return ValidationOutcome::invalid("Please enter a valid date of birth");
    }
    ValidationOutcome::valid()
}

pub fn validate_year(value: &str, label: &str, bounds: YearBounds) -> ValidationOutcome {
    if value.trim().is_empty() {
        return ValidationOutcome::invalid(format!("{label} is required"));
    }
    let Some(year) = parse_year(value) else {
        return ValidationOutcome::invalid(format!("{label} must be a 4-digit year"));
    };
    if year < bounds.min || year > bounds.max {
        return ValidationOutcome::invalid(format!(
            "{label} must be between {} and {}",
            bounds.min, bounds.max
        ));
    }
    ValidationOutcome::valid()
}

/// Checks the end of a year range against its start.
pub fn validate_year_range(start: &str, end: &str) -> ValidationOutcome {
    if end.trim().is_empty() {
        return ValidationOutcome::invalid("End year is required");
    }
    let Some(end_year) = parse_year(end) else {
        return ValidationOutcome::invalid("End year must be a 4-digit year");
    };
    match parse_year(start) {
        Some(start_year) if end_year < start_year => {
            ValidationOutcome::invalid("End year cannot be before start year")
        }
        _ => ValidationOutcome::valid(),
    }
}

/// Checks the end of a date range against its start.
pub fn validate_date_range(start: &str, end: &str) -> ValidationOutcome {
    if end.trim().is_empty() {
        return ValidationOutcome::invalid("End date is required");
    }
    let Some(end_date) = parse_date(end) else {
        return ValidationOutcome::invalid("Enter a valid end date");
    };
    match parse_date(start) {
        Some(start_date) if end_date < start_date => {
            ValidationOutcome::invalid("End date cannot be before start date")
        }
        _ => ValidationOutcome::valid(),
    }
}

pub fn validate_date(value: &str, label: &str) -> ValidationOutcome {
    if value.trim().is_empty() {
        return ValidationOutcome::invalid(format!("{label} is required"));
    }
    match parse_date(value) {
        Some(_) => ValidationOutcome::valid(),
        None => ValidationOutcome::invalid(format!("Enter a valid {}", label.to_lowercase())),
    }
}

pub fn validate_max_length(value: &str, label: &str, max: usize) -> ValidationOutcome {
    if value.chars().count() > max {
        ValidationOutcome::invalid(format!("{label} cannot exceed {max} characters"))
    } else {
        ValidationOutcome::valid()
    }
}
