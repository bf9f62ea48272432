//! Wizard controller.
//!
//! Owns the step index, the field and error stores, and the submission
//! guard for one wizard instance. Steps advance strictly one at a time and
//! only when the current step's predicate holds; going back is always
//! allowed. A rejected advance reveals every failing input of the step at
//! once.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::assembler::{self, SubmissionError, SubmissionPayload, Submitter};
use crate::errors::{Result, WizardError};
use crate::form::{
    Entry, EntryId, ErrorMap, FieldPath, FieldStore, FieldValue, Selection, Selections,
};
use crate::predicate::{self, GateTarget};
use crate::preferences::{PreferencesRepository, StoredSelections};
use crate::schema::{Requirement, SelectionMode, SelectionSpec, StepSpec, WizardSchema};
use crate::time::Clock;
use crate::validation::ValidationOutcome;

/// Result of a navigation or submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Step changed. Views scroll back to the top.
    Moved { from: usize, to: usize },
    /// The step gate refused; `invalid` lists the error keys now set.
    Rejected { step: usize, invalid: Vec<String> },
    /// Terminal step passed; hand the payload to the submitter and report
    /// back through [`WizardController::finish_submission`].
    Submit(SubmissionPayload),
    Completed(SubmissionPayload),
    /// Submission rejected; all input is kept for a retry.
    Failed { message: String },
    /// Back was pressed on the first step.
    Exit,
    Ignored,
}

impl Transition {
    pub fn scroll_to_top(&self) -> bool {
        matches!(self, Transition::Moved { .. })
    }
}

pub struct WizardController {
    schema: WizardSchema,
    clock: Arc<dyn Clock>,
    store: FieldStore,
    selections: Selections,
    errors: ErrorMap,
    step: usize,
    submitting: bool,
    pending: Option<SubmissionPayload>,
    submission_error: Option<String>,
    finished: bool,
    preferences: Option<Arc<dyn PreferencesRepository>>,
}

impl WizardController {
    pub fn new(schema: WizardSchema, clock: Arc<dyn Clock>) -> Self {
        let mut store = FieldStore::new();
        for section in schema.sections() {
            store.ensure_section(section.id);
        }
        let selections = schema
            .selections()
            .into_iter()
            .map(|spec| (spec.key.to_string(), empty_selection(spec.mode)))
            .collect();

        Self {
            schema,
            clock,
            store,
            selections,
            errors: ErrorMap::new(),
            step: 1,
            submitting: false,
            pending: None,
            submission_error: None,
            finished: false,
            preferences: None,
        }
    }

    /// Seeds values carried over from an upstream screen.
    pub fn with_prefill<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<FieldPath>,
        V: Into<FieldValue>,
    {
        for (key, value) in values {
            self.set_field(key, value)?;
        }
        Ok(self)
    }

    /// Attaches a preferences repository and restores remembered selections.
    /// A failing repository is logged and otherwise ignored.
    pub fn with_preferences(mut self, repository: Arc<dyn PreferencesRepository>) -> Self {
        match repository.load(self.schema.name) {
            Ok(Some(stored)) => {
                for spec in self.schema.selections() {
                    if !spec.remember {
                        continue;
                    }
                    if let Some(selection) = stored.get(spec.key).filter(|s| fits(spec, s)) {
                        self.selections.insert(spec.key.to_string(), selection.clone());
                    }
                }
                debug!(flow = self.schema.name, "restored remembered selections");
            }
            Ok(None) => {}
            Err(err) => {
                warn!(flow = self.schema.name, error = %err, "could not load preferences");
            }
        }
        self.preferences = Some(repository);
        self
    }

    /// Overwrites a field value. An existing error on the field (or on a
    /// field reading it) is recomputed; clean fields are not validated.
    pub fn set_field(
        &mut self,
        path: impl Into<FieldPath>,
        value: impl Into<FieldValue>,
    ) -> Result<()> {
        let path = path.into();
        let spec = self
            .schema
            .field_spec(&path)
            .ok_or_else(|| WizardError::UnknownField(path.to_string()))?;
        let value = spec.rule.clean(value.into());
        let raised_flag = value.as_flag();
        self.store.set(&path, value)?;
        debug!(field = %path, "field updated");

        let key = path.field_key();
        let mut cleared = Vec::new();
        let mut dependents = Vec::new();
        for sibling in self.schema.scope_fields(&path) {
            let waived_by_key =
                matches!(sibling.requirement, Requirement::UnlessFlag(flag) if flag == key);
            if raised_flag && waived_by_key {
                cleared.push(path.sibling(sibling.key));
            } else if waived_by_key || sibling.rule.depends_on() == Some(key) {
                dependents.push(path.sibling(sibling.key));
            }
        }

        for target in cleared {
            self.store.set(&target, FieldValue::Empty)?;
            self.errors.clear(&target.error_key());
            debug!(field = %target, "cleared by flag");
        }
        self.recompute_error_if_present(&path);
        for target in dependents {
            self.recompute_error_if_present(&target);
        }
        Ok(())
    }

    /// Validates a field unconditionally, as when it loses focus.
    pub fn blur_field(&mut self, path: impl Into<FieldPath>) -> Result<ValidationOutcome> {
        let path = path.into();
        if self.schema.field_spec(&path).is_none() {
            return Err(WizardError::UnknownField(path.to_string()));
        }
        if self.store.scope(&path).is_none() {
            return Err(WizardError::EntryNotFound(path.to_string()));
        }
        Ok(self.validate_and_set_error(&path))
    }

    pub fn select(&mut self, key: &str, option: impl Into<String>) -> Result<()> {
        let option = option.into();
        let mode = self.checked_selection(key, &option)?;
        let selection = self
            .selections
            .entry(key.to_string())
            .or_insert_with(|| empty_selection(mode));
        match selection {
            Selection::Single(choice) => *choice = Some(option),
            Selection::Multi(choices) => {
                choices.insert(option);
            }
        }
        debug!(selection = key, "selection updated");
        self.recompute_selection_error(key);
        Ok(())
    }

    /// Flips one option: deselects a chosen single value, toggles set
    /// membership for multi selections.
    pub fn toggle_selection(&mut self, key: &str, option: impl Into<String>) -> Result<()> {
        let option = option.into();
        let mode = self.checked_selection(key, &option)?;
        let selection = self
            .selections
            .entry(key.to_string())
            .or_insert_with(|| empty_selection(mode));
        match selection {
            Selection::Single(choice) => {
                if choice.as_deref() == Some(option.as_str()) {
                    *choice = None;
                } else {
                    *choice = Some(option);
                }
            }
            Selection::Multi(choices) => {
                if !choices.remove(&option) {
                    choices.insert(option);
                }
            }
        }
        debug!(selection = key, "selection toggled");
        self.recompute_selection_error(key);
        Ok(())
    }

    pub fn add_entry(&mut self, section: &str) -> Result<EntryId> {
        if self.schema.section(section).is_none() {
            return Err(WizardError::UnknownSection(section.to_string()));
        }
        let id = self.store.add_entry(section)?;
        debug!(section, entry = %id, "entry added");
        Ok(id)
    }

    /// Removes an entry and its errors. The last entry of a section stays.
    pub fn remove_entry(&mut self, section: &str, entry: EntryId) -> Result<()> {
        self.store.remove_entry(section, entry)?;
        self.errors.clear_entry(entry);
        debug!(section, entry = %entry, "entry removed");
        Ok(())
    }

    pub fn advance(&mut self) -> Transition {
        if self.finished || self.submitting {
            debug!(step = self.step, "advance ignored");
            return Transition::Ignored;
        }
        let today = self.clock.today();
        let Some(step) = self.schema.step(self.step) else {
            return Transition::Ignored;
        };

        if !predicate::step_is_valid(step, &self.store, &self.selections, today) {
            return self.reject(self.step, today);
        }

        if self.schema.is_terminal(self.step) {
            // Earlier steps may have been edited since they were passed.
            if let Some(stale) = self.first_invalid_step(today) {
                return self.reject(stale, today);
            }
            let payload = assembler::assemble(&self.schema, &self.store, &self.selections, today);
            self.submitting = true;
            self.submission_error = None;
            self.pending = Some(payload.clone());
            info!(flow = self.schema.name, "submission dispatched");
            return Transition::Submit(payload);
        }

        let from = self.step;
        self.step += 1;
        info!(flow = self.schema.name, from, to = self.step, "advanced");
        Transition::Moved { from, to: self.step }
    }

    pub fn retreat(&mut self) -> Transition {
        if self.finished || self.submitting {
            return Transition::Ignored;
        }
        if self.step > 1 {
            let from = self.step;
            self.step -= 1;
            info!(flow = self.schema.name, from, to = self.step, "retreated");
            Transition::Moved { from, to: self.step }
        } else {
            info!(flow = self.schema.name, "exit requested from first step");
            Transition::Exit
        }
    }

    /// Reports the collaborator's answer for the in-flight submission.
    pub fn finish_submission(
        &mut self,
        result: std::result::Result<(), SubmissionError>,
    ) -> Transition {
        if !self.submitting {
            return Transition::Ignored;
        }
        self.submitting = false;
        let payload = self.pending.take().unwrap_or_default();

        match result {
            Ok(()) => {
                self.finished = true;
                self.remember_selections();
                info!(flow = self.schema.name, "submission completed");
                Transition::Completed(payload)
            }
            Err(err) => {
                warn!(flow = self.schema.name, error = %err, "submission failed");
                self.submission_error = Some(err.message.clone());
                Transition::Failed {
                    message: err.message,
                }
            }
        }
    }

    /// Advances and, on the terminal step, runs `submitter` synchronously.
    pub fn submit_with<S: Submitter + ?Sized>(&mut self, submitter: &mut S) -> Transition {
        match self.advance() {
            Transition::Submit(payload) => {
                let result = submitter.submit(&payload);
                self.finish_submission(result)
            }
            other => other,
        }
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.schema.len()
    }

    pub fn current_step_spec(&self) -> Option<&StepSpec> {
        self.schema.step(self.step)
    }

    pub fn is_current_step_valid(&self) -> bool {
        self.schema.step(self.step).is_some_and(|step| {
            predicate::step_is_valid(step, &self.store, &self.selections, self.clock.today())
        })
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn value(&self, path: impl Into<FieldPath>) -> Option<&FieldValue> {
        self.store.get(&path.into())
    }

    pub fn entries(&self, section: &str) -> &[Entry] {
        self.store.entries(section)
    }

    pub fn selection(&self, key: &str) -> Option<&Selection> {
        self.selections.get(key)
    }

    pub fn schema(&self) -> &WizardSchema {
        &self.schema
    }

    fn checked_selection(&self, key: &str, option: &str) -> Result<SelectionMode> {
        let spec = self
            .schema
            .selection(key)
            .ok_or_else(|| WizardError::UnknownSelection(key.to_string()))?;
        if !spec.accepts(option) {
            return Err(WizardError::InvalidOption {
                selection: key.to_string(),
                option: option.to_string(),
            });
        }
        Ok(spec.mode)
    }

    fn recompute_error_if_present(&mut self, path: &FieldPath) {
        if self.errors.has_error(&path.error_key()) {
            self.validate_and_set_error(path);
        }
    }

    fn validate_and_set_error(&mut self, path: &FieldPath) -> ValidationOutcome {
        let today = self.clock.today();
        let outcome = match (self.schema.field_spec(path), self.store.scope(path)) {
            (Some(spec), Some(scope)) => spec.validate(scope, today),
            _ => ValidationOutcome::valid(),
        };
        self.errors.set(path.error_key(), outcome.error.clone());
        outcome
    }

    fn recompute_selection_error(&mut self, key: &str) {
        if self.errors.has_error(key) {
            self.validate_selection(key);
        }
    }

    fn validate_selection(&mut self, key: &str) -> bool {
        let satisfied = self.selections.get(key).is_some_and(Selection::is_made);
        let message = self.schema.selection(key).map(SelectionSpec::missing_message);
        self.errors.set(key, if satisfied { None } else { message });
        satisfied
    }

    fn first_invalid_step(&self, today: NaiveDate) -> Option<usize> {
        (1..=self.schema.len()).find(|&number| {
            self.schema.step(number).is_some_and(|step| {
                !predicate::step_is_valid(step, &self.store, &self.selections, today)
            })
        })
    }

    /// Moves to step `number` and reveals the errors that block it.
    fn reject(&mut self, number: usize, today: NaiveDate) -> Transition {
        let targets = self
            .schema
            .step(number)
            .map(|step| predicate::gate_targets(step, &self.store, today))
            .unwrap_or_default();
        let invalid = self.reveal(targets);
        self.step = number;
        warn!(
            flow = self.schema.name,
            step = number,
            invalid = invalid.len(),
            "step gate rejected advance"
        );
        Transition::Rejected {
            step: number,
            invalid,
        }
    }

    fn reveal(&mut self, targets: Vec<GateTarget>) -> Vec<String> {
        let mut invalid = Vec::new();
        for target in targets {
            match target {
                GateTarget::Field(path) => {
                    if !self.validate_and_set_error(&path).is_valid {
                        invalid.push(path.error_key());
                    }
                }
                GateTarget::Selection(key) => {
                    if !self.validate_selection(key) {
                        invalid.push(key.to_string());
                    }
                }
            }
        }
        invalid
    }

    fn remember_selections(&self) {
        let Some(repository) = &self.preferences else {
            return;
        };
        let stored: StoredSelections = self
            .schema
            .selections()
            .into_iter()
            .filter(|spec| spec.remember)
            .filter_map(|spec| {
                self.selections
                    .get(spec.key)
                    .filter(|selection| selection.is_made())
                    .map(|selection| (spec.key.to_string(), selection.clone()))
            })
            .collect();
        if stored.is_empty() {
            return;
        }
        if let Err(err) = repository.save(self.schema.name, &stored) {
            warn!(flow = self.schema.name, error = %err, "could not save preferences");
        }
    }
}

fn empty_selection(mode: SelectionMode) -> Selection {
    match mode {
        SelectionMode::Single => Selection::Single(None),
        SelectionMode::Multi => Selection::Multi(Default::default()),
    }
}

/// Whether a stored selection still matches the declared mode and options.
fn fits(spec: &SelectionSpec, selection: &Selection) -> bool {
    match (spec.mode, selection) {
        (SelectionMode::Single, Selection::Single(choice)) => {
            choice.as_deref().map_or(true, |option| spec.accepts(option))
        }
        (SelectionMode::Multi, Selection::Multi(choices)) => {
            choices.iter().all(|option| spec.accepts(option))
        }
        _ => false,
    }
}
