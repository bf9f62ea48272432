//! Declarative description of a wizard: ordered steps, their fields and the
//! rules gating each one.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use wizard_config::PasswordPolicy;

use crate::form::{FieldPath, FieldValue, Scope};
use crate::validation::{
    clean_mobile, validate_date, validate_date_of_birth, validate_date_range,
    validate_email, validate_max_length, validate_mobile, validate_password, validate_required,
    validate_year, validate_year_range, AgeRange, NameRule, ValidationOutcome, YearBounds,
};

type RuleCallback = dyn Fn(&FieldValue) -> ValidationOutcome + Send + Sync;
type SharedRuleCallback = Arc<RuleCallback>;

static EMPTY: FieldValue = FieldValue::Empty;

/// Validator attached to a field.
#[derive(Clone)]
pub enum FieldRule {
    Text,
    Name(NameRule),
    Email,
    Mobile { digits: usize },
    Password(PasswordPolicy),
    DateOfBirth(AgeRange),
    /// Year between `min` and the current year.
    Year { min: i32 },
    /// End of a year range; `start` names the sibling start field.
    YearAfter { start: &'static str, min: i32 },
    Date,
    /// End of a date range; `start` names the sibling start field.
    DateAfter { start: &'static str },
    MaxLength(usize),
    Flag,
    Custom(SharedRuleCallback),
}

impl FieldRule {
    /// Normalizes a raw value before it is stored.
    pub fn clean(&self, value: FieldValue) -> FieldValue {
        match (self, value) {
            (FieldRule::Mobile { .. }, FieldValue::Text(raw)) => {
                FieldValue::Text(clean_mobile(&raw))
            }
            (_, value) => value,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            FieldRule::Date | FieldRule::DateAfter { .. } | FieldRule::DateOfBirth(_)
        )
    }

    /// Sibling field this rule reads, if any.
    pub fn depends_on(&self) -> Option<&'static str> {
        match self {
            FieldRule::YearAfter { start, .. } | FieldRule::DateAfter { start } => Some(*start),
            _ => None,
        }
    }

    /// Values that must be submitted byte for byte.
    pub fn keeps_whitespace(&self) -> bool {
        matches!(self, FieldRule::Password(_))
    }
}

/// When a field must hold a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Always,
    Optional,
    /// Required unless the named sibling flag is set. Setting the flag
    /// clears this field.
    UnlessFlag(&'static str),
}

impl Requirement {
    pub fn is_required(&self, scope: &Scope) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::Optional => false,
            Requirement::UnlessFlag(flag) => !scope.get(*flag).is_some_and(FieldValue::as_flag),
        }
    }
}

/// One field of a step or of a repeatable section.
#[derive(Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub rule: FieldRule,
    pub requirement: Requirement,
}

impl FieldSpec {
    pub fn new(key: &'static str, label: &'static str, rule: FieldRule) -> Self {
        Self {
            key,
            label,
            rule,
            requirement: Requirement::Always,
        }
    }

    pub fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    pub fn unless_flag(mut self, flag: &'static str) -> Self {
        self.requirement = Requirement::UnlessFlag(flag);
        self
    }

    /// Runs the rule against this field's value in `scope`.
    pub fn validate(&self, scope: &Scope, today: NaiveDate) -> ValidationOutcome {
        let value = scope.get(self.key).unwrap_or(&EMPTY);
        let required = self.requirement.is_required(scope);
        if !required && value.is_empty() {
            return ValidationOutcome::valid();
        }

        let text = value.as_text();
        let years = |min: i32| YearBounds {
            min,
            max: today.year(),
        };
        let sibling = |key: &str| scope.get(key).map(FieldValue::as_text).unwrap_or_default();

        match &self.rule {
            FieldRule::Text => validate_required(&text, self.label),
            FieldRule::Name(rule) => rule.validate(&text),
            FieldRule::Email => validate_email(&text),
            FieldRule::Mobile { digits } => validate_mobile(&text, *digits),
            FieldRule::Password(policy) => validate_password(&text, policy),
            FieldRule::DateOfBirth(range) => validate_date_of_birth(&text, *range, today),
            FieldRule::Year { min } => validate_year(&text, self.label, years(*min)),
            FieldRule::YearAfter { start, min } => validate_year(&text, self.label, years(*min))
                .and_then(|| validate_year_range(&sibling(*start), &text)),
            FieldRule::Date => validate_date(&text, self.label),
            FieldRule::DateAfter { start } => validate_date(&text, self.label)
                .and_then(|| validate_date_range(&sibling(*start), &text)),
            FieldRule::MaxLength(max) => {
                let presence = if required {
                    validate_required(&text, self.label)
                } else {
                    ValidationOutcome::valid()
                };
                presence.and_then(|| validate_max_length(&text, self.label, *max))
            }
            FieldRule::Flag => ValidationOutcome::valid(),
            FieldRule::Custom(callback) => callback(value),
        }
    }
}

/// Repeatable group of fields (one education record, one role).
#[derive(Clone)]
pub struct SectionSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl SectionSpec {
    pub fn new(id: &'static str, label: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self { id, label, fields }
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.key == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multi,
}

/// Selection-only input. Empty `options` accepts any value.
#[derive(Debug, Clone)]
pub struct SelectionSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub mode: SelectionMode,
    pub options: Vec<String>,
    pub remember: bool,
    pub follow_ups: Vec<FollowUp>,
}

impl SelectionSpec {
    pub fn single(key: &'static str, label: &'static str, options: Vec<String>) -> Self {
        Self {
            key,
            label,
            mode: SelectionMode::Single,
            options,
            remember: false,
            follow_ups: Vec::new(),
        }
    }

    pub fn multi(key: &'static str, label: &'static str, options: Vec<String>) -> Self {
        Self {
            mode: SelectionMode::Multi,
            ..Self::single(key, label, options)
        }
    }

    pub fn remembered(mut self) -> Self {
        self.remember = true;
        self
    }

    pub fn with_follow_up(mut self, when: impl Into<String>, spec: SelectionSpec) -> Self {
        self.follow_ups.push(FollowUp {
            when: when.into(),
            spec,
        });
        self
    }

    pub fn accepts(&self, option: &str) -> bool {
        self.options.is_empty() || self.options.iter().any(|candidate| candidate == option)
    }

    pub fn missing_message(&self) -> String {
        match self.mode {
            SelectionMode::Single => format!("Please choose a {}", self.label.to_lowercase()),
            SelectionMode::Multi => {
                format!("Please select at least one {}", self.label.to_lowercase())
            }
        }
    }
}

/// Optional selection revealed when its parent holds `when`. Never gates.
#[derive(Debug, Clone)]
pub struct FollowUp {
    pub when: String,
    pub spec: SelectionSpec,
}

/// Tagged step definitions.
#[derive(Clone)]
pub enum StepKind {
    /// Every required field must pass its validator.
    Form(Vec<FieldSpec>),
    /// Each section needs at least one fully valid entry.
    Repeatable(Vec<SectionSpec>),
    /// A choice must be made.
    Selection(SelectionSpec),
    /// Optional content; advancing is never blocked.
    Open(Vec<FieldSpec>),
}

#[derive(Clone)]
pub struct StepSpec {
    pub title: &'static str,
    pub kind: StepKind,
}

impl StepSpec {
    pub fn new(title: &'static str, kind: StepKind) -> Self {
        Self { title, kind }
    }

    /// Top-level fields declared by this step.
    pub fn fields(&self) -> &[FieldSpec] {
        match &self.kind {
            StepKind::Form(fields) | StepKind::Open(fields) => fields,
            StepKind::Repeatable(_) | StepKind::Selection(_) => &[],
        }
    }

    pub fn sections(&self) -> &[SectionSpec] {
        match &self.kind {
            StepKind::Repeatable(sections) => sections,
            _ => &[],
        }
    }
}

/// Ordered steps of one flow. Step numbers are 1-based.
#[derive(Clone)]
pub struct WizardSchema {
    pub name: &'static str,
    pub steps: Vec<StepSpec>,
}

impl WizardSchema {
    pub fn new(name: &'static str, steps: Vec<StepSpec>) -> Self {
        Self { name, steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, number: usize) -> Option<&StepSpec> {
        number.checked_sub(1).and_then(|index| self.steps.get(index))
    }

    pub fn is_terminal(&self, number: usize) -> bool {
        number == self.steps.len()
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionSpec> {
        self.steps.iter().flat_map(StepSpec::sections)
    }

    pub fn section(&self, id: &str) -> Option<&SectionSpec> {
        self.sections().find(|section| section.id == id)
    }

    /// Every top-level field across all steps, in step order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.steps.iter().flat_map(StepSpec::fields)
    }

    pub fn field_spec(&self, path: &FieldPath) -> Option<&FieldSpec> {
        match path {
            FieldPath::Field(key) => self.fields().find(|spec| spec.key == key),
            FieldPath::Entry { section, field, .. } => {
                self.section(section).and_then(|section| section.field(field))
            }
        }
    }

    /// Fields sharing a scope with `path`.
    pub fn scope_fields(&self, path: &FieldPath) -> Vec<&FieldSpec> {
        match path {
            FieldPath::Field(_) => self.fields().collect(),
            FieldPath::Entry { section, .. } => self
                .section(section)
                .map(|section| section.fields.iter().collect())
                .unwrap_or_default(),
        }
    }

    /// Top-level selections, including follow-ups.
    pub fn selections(&self) -> Vec<&SelectionSpec> {
        let mut specs = Vec::new();
        for step in &self.steps {
            if let StepKind::Selection(spec) = &step.kind {
                specs.push(spec);
                specs.extend(spec.follow_ups.iter().map(|follow_up| &follow_up.spec));
            }
        }
        specs
    }

    pub fn selection(&self, key: &str) -> Option<&SelectionSpec> {
        self.selections().into_iter().find(|spec| spec.key == key)
    }
}

/// Convenience for building a rule from a plain closure.
pub fn custom_rule(
    callback: impl Fn(&FieldValue) -> ValidationOutcome + Send + Sync + 'static,
) -> FieldRule {
    FieldRule::Custom(Arc::new(callback))
}
