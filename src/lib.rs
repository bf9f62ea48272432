#![doc(test(attr(deny(warnings))))]

//! Wizard Core models multi-step onboarding and creation flows: per-field
//! validators, field and error stores, step gating, and payload assembly,
//! with no dependency on any UI toolkit.

pub mod assembler;
pub mod controller;
pub mod errors;
pub mod flows;
pub mod form;
pub mod interaction;
pub mod predicate;
pub mod preferences;
pub mod schema;
pub mod time;
pub mod utils;
pub mod validation;

pub use assembler::{PayloadValue, SubmissionError, SubmissionPayload, Submitter};
pub use controller::{Transition, WizardController};
pub use errors::{Result, WizardError};
pub use form::{EntryId, ErrorMap, FieldPath, FieldStore, FieldValue};
pub use schema::{FieldRule, FieldSpec, Requirement, StepKind, StepSpec, WizardSchema};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Wizard Core tracing initialized.");
    });
}
