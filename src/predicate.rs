//! Step validity predicates.
//!
//! A form step passes only when every required field passes its own
//! validator. A repeatable step passes when each section holds at least one
//! fully valid entry; other entries may stay incomplete.

use chrono::NaiveDate;

use crate::form::{Entry, FieldPath, FieldStore, Selection, Selections};
use crate::schema::{SectionSpec, SelectionSpec, StepKind, StepSpec};

pub fn entry_is_valid(section: &SectionSpec, entry: &Entry, today: NaiveDate) -> bool {
    section
        .fields
        .iter()
        .all(|spec| spec.validate(&entry.fields, today).is_valid)
}

pub fn section_is_satisfied(section: &SectionSpec, store: &FieldStore, today: NaiveDate) -> bool {
    store
        .entries(section.id)
        .iter()
        .any(|entry| entry_is_valid(section, entry, today))
}

pub fn selection_is_satisfied(spec: &SelectionSpec, selections: &Selections) -> bool {
    selections.get(spec.key).is_some_and(Selection::is_made)
}

pub fn step_is_valid(
    step: &StepSpec,
    store: &FieldStore,
    selections: &Selections,
    today: NaiveDate,
) -> bool {
    match &step.kind {
        StepKind::Form(fields) => fields
            .iter()
            .all(|spec| spec.validate(store.fields(), today).is_valid),
        StepKind::Repeatable(sections) => sections
            .iter()
            .all(|section| section_is_satisfied(section, store, today)),
        StepKind::Selection(spec) => selection_is_satisfied(spec, selections),
        StepKind::Open(_) => true,
    }
}

/// What a rejected advance must reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateTarget {
    Field(FieldPath),
    Selection(&'static str),
}

/// Every input whose error must be (re)computed when `step` rejects an
/// advance. Sections that already have a valid entry are left alone.
pub fn gate_targets(step: &StepSpec, store: &FieldStore, today: NaiveDate) -> Vec<GateTarget> {
    match &step.kind {
        StepKind::Form(fields) => fields
            .iter()
            .map(|spec| GateTarget::Field(FieldPath::field(spec.key)))
            .collect(),
        StepKind::Repeatable(sections) => sections
            .iter()
            .filter(|section| !section_is_satisfied(section, store, today))
            .flat_map(|section| {
                store.entries(section.id).iter().flat_map(move |entry| {
                    section.fields.iter().map(move |spec| {
                        GateTarget::Field(FieldPath::entry(section.id, entry.id, spec.key))
                    })
                })
            })
            .collect(),
        StepKind::Selection(spec) => vec![GateTarget::Selection(spec.key)],
        StepKind::Open(_) => Vec::new(),
    }
}
