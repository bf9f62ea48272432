//! Turns wizard state into the outbound request payload.
//!
//! Only individually valid entries survive, strings are trimmed, empty
//! optional values are omitted and dates are rendered as ISO `YYYY-MM-DD`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::form::{FieldStore, FieldValue, Scope, Selection, Selections};
use crate::predicate::entry_is_valid;
use crate::schema::{FieldSpec, SelectionSpec, WizardSchema};
use crate::validation::{parse_date, to_iso};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub flow: String,
    pub fields: BTreeMap<String, PayloadValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<String, Vec<BTreeMap<String, PayloadValue>>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub selections: BTreeMap<String, PayloadValue>,
}

impl SubmissionPayload {
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(PayloadValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Rejection reported by the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// External collaborator that receives the assembled payload (signup API,
/// event-create API).
pub trait Submitter {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<(), SubmissionError>;
}

impl<F> Submitter for F
where
    F: FnMut(&SubmissionPayload) -> Result<(), SubmissionError>,
{
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<(), SubmissionError> {
        self(payload)
    }
}

pub fn assemble(
    schema: &WizardSchema,
    store: &FieldStore,
    selections: &Selections,
    today: NaiveDate,
) -> SubmissionPayload {
    let fields = collect_fields(schema.fields(), store.fields());

    let mut sections = BTreeMap::new();
    for section in schema.sections() {
        let entries: Vec<_> = store
            .entries(section.id)
            .iter()
            .filter(|entry| entry_is_valid(section, entry, today))
            .map(|entry| collect_fields(section.fields.iter(), &entry.fields))
            .collect();
        sections.insert(section.id.to_string(), entries);
    }

    let mut chosen = BTreeMap::new();
    for spec in schema.selections() {
        if let Some(value) = selections.get(spec.key).and_then(selection_value) {
            chosen.insert(spec.key.to_string(), value);
        }
    }
    drop_hidden_follow_ups(schema, selections, &mut chosen);

    SubmissionPayload {
        flow: schema.name.to_string(),
        fields,
        sections,
        selections: chosen,
    }
}

fn collect_fields<'a>(
    specs: impl Iterator<Item = &'a FieldSpec>,
    scope: &Scope,
) -> BTreeMap<String, PayloadValue> {
    specs
        .filter_map(|spec| {
            let value = scope.get(spec.key)?;
            payload_value(spec, value).map(|value| (spec.key.to_string(), value))
        })
        .collect()
}

fn payload_value(spec: &FieldSpec, value: &FieldValue) -> Option<PayloadValue> {
    match value {
        FieldValue::Empty => None,
        FieldValue::Flag(flag) => Some(PayloadValue::Flag(*flag)),
        FieldValue::Date(date) => Some(PayloadValue::Text(to_iso(*date))),
        FieldValue::Text(text) if spec.rule.keeps_whitespace() => {
            (!text.is_empty()).then(|| PayloadValue::Text(text.clone()))
        }
        FieldValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            let rendered = if spec.rule.is_date() {
                parse_date(trimmed)
                    .map(to_iso)
                    .unwrap_or_else(|| trimmed.to_string())
            } else {
                trimmed.to_string()
            };
            Some(PayloadValue::Text(rendered))
        }
    }
}

fn selection_value(selection: &Selection) -> Option<PayloadValue> {
    match selection {
        Selection::Single(choice) => choice.clone().map(PayloadValue::Text),
        Selection::Multi(choices) if choices.is_empty() => None,
        Selection::Multi(choices) => Some(PayloadValue::List(choices.iter().cloned().collect())),
    }
}

/// Follow-ups only travel when their parent still holds the revealing value.
fn drop_hidden_follow_ups(
    schema: &WizardSchema,
    selections: &Selections,
    chosen: &mut BTreeMap<String, PayloadValue>,
) {
    let parents: Vec<&SelectionSpec> = schema
        .selections()
        .into_iter()
        .filter(|spec| !spec.follow_ups.is_empty())
        .collect();
    for parent in parents {
        let current = selections.get(parent.key);
        for follow_up in &parent.follow_ups {
            let revealed = current.is_some_and(|selection| selection.contains(&follow_up.when));
            if !revealed {
                chosen.remove(follow_up.spec.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldRule, StepKind, StepSpec};
    use wizard_config::PasswordPolicy;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn schema() -> WizardSchema {
        WizardSchema::new(
            "profile",
            vec![StepSpec::new(
                "Basics",
                StepKind::Form(vec![
                    FieldSpec::new("name", "Name", FieldRule::Text),
                    FieldSpec::new("bio", "Bio", FieldRule::MaxLength(200)).optional(),
                    FieldSpec::new("birthday", "Birthday", FieldRule::Date),
                    FieldSpec::new(
                        "password",
                        "Password",
                        FieldRule::Password(PasswordPolicy::default()),
                    ),
                ]),
            )],
        )
    }

    #[test]
    fn trims_omits_and_normalizes_dates() {
        let mut store = FieldStore::new();
        store.set(&"name".into(), "  Ana Lima ".into()).unwrap();
        store.set(&"bio".into(), "   ".into()).unwrap();
        store.set(&"birthday".into(), "March 15, 2001".into()).unwrap();
        store.set(&"password".into(), " Sup3r$ecret".into()).unwrap();

        let payload = assemble(&schema(), &store, &Selections::new(), today());

        assert_eq!(payload.flow, "profile");
        assert_eq!(payload.text("name"), Some("Ana Lima"));
        assert!(!payload.fields.contains_key("bio"));
        assert_eq!(payload.text("birthday"), Some("2001-03-15"));
        assert_eq!(payload.text("password"), Some(" Sup3r$ecret"));
    }

    #[test]
    fn date_values_render_as_iso() {
        let mut store = FieldStore::new();
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        store.set(&"birthday".into(), date.into()).unwrap();

        let payload = assemble(&schema(), &store, &Selections::new(), today());
        assert_eq!(payload.text("birthday"), Some("1999-12-31"));
    }

    #[test]
    fn closures_act_as_submitters() {
        let mut seen = Vec::new();
        let mut submitter = |payload: &SubmissionPayload| -> Result<(), SubmissionError> {
            seen.push(payload.flow.clone());
            Err(SubmissionError::new("Email already registered"))
        };
        let result = submitter.submit(&SubmissionPayload::default());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Email already registered"
        );
        assert_eq!(seen, vec![String::new()]);
    }
}
