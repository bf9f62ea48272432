//! Drives a [`WizardController`] from an interactive front end.
//!
//! The driver loop is independent of how input is gathered: anything that
//! can produce [`WizardCommand`]s implements [`WizardInteraction`]. The
//! terminal implementation uses dialoguer prompts.

use std::collections::{HashSet, VecDeque};

use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};
use tracing::{debug, error};

use crate::assembler::{SubmissionPayload, Submitter};
use crate::controller::{Transition, WizardController};
use crate::errors::{Result, WizardError};
use crate::form::{EntryId, FieldPath, FieldValue, Selection};
use crate::schema::{
    FieldRule, FieldSpec, Requirement, SectionSpec, SelectionMode, SelectionSpec, StepKind,
};

/// One user intent applied to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    Set { path: FieldPath, value: FieldValue },
    Blur(FieldPath),
    Select { key: String, option: String },
    Toggle { key: String, option: String },
    AddEntry(String),
    RemoveEntry { section: String, entry: EntryId },
    Next,
    Back,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Submitted(SubmissionPayload),
    /// Back was chosen on the first step.
    Exited,
    Cancelled,
}

pub trait WizardInteraction {
    fn next_command(&mut self, controller: &WizardController) -> WizardCommand;

    fn report(&mut self, _transition: &Transition, _controller: &WizardController) {}

    fn report_error(&mut self, _error: &WizardError) {}
}

/// Runs the command loop until the wizard submits, exits or is cancelled.
/// A failed submission keeps the wizard on its terminal step for a retry.
pub fn run_wizard<I, S>(
    controller: &mut WizardController,
    interaction: &mut I,
    submitter: &mut S,
) -> WizardOutcome
where
    I: WizardInteraction + ?Sized,
    S: Submitter + ?Sized,
{
    loop {
        let command = interaction.next_command(controller);
        debug!(?command, step = controller.current_step(), "wizard command");
        let applied = match command {
            WizardCommand::Set { path, value } => controller.set_field(path, value),
            WizardCommand::Blur(path) => controller.blur_field(path).map(|_| ()),
            WizardCommand::Select { key, option } => controller.select(&key, option),
            WizardCommand::Toggle { key, option } => controller.toggle_selection(&key, option),
            WizardCommand::AddEntry(section) => controller.add_entry(&section).map(|_| ()),
            WizardCommand::RemoveEntry { section, entry } => {
                controller.remove_entry(&section, entry)
            }
            WizardCommand::Cancel => return WizardOutcome::Cancelled,
            WizardCommand::Back => {
                let transition = controller.retreat();
                interaction.report(&transition, controller);
                if transition == Transition::Exit {
                    return WizardOutcome::Exited;
                }
                Ok(())
            }
            WizardCommand::Next => {
                let transition = match controller.advance() {
                    Transition::Submit(payload) => {
                        interaction.report(&Transition::Submit(payload.clone()), controller);
                        let result = submitter.submit(&payload);
                        controller.finish_submission(result)
                    }
                    other => other,
                };
                interaction.report(&transition, controller);
                if let Transition::Completed(payload) = transition {
                    return WizardOutcome::Submitted(payload);
                }
                Ok(())
            }
        };

        if let Err(err) = applied {
            interaction.report_error(&err);
        }
    }
}

/// Prompts in the terminal. Each step's inputs are gathered into a queue of
/// commands that the driver then applies one at a time.
pub struct TerminalInteraction {
    theme: ColorfulTheme,
    queue: VecDeque<WizardCommand>,
    visited: HashSet<EntryId>,
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            queue: VecDeque::new(),
            visited: HashSet::new(),
        }
    }

    fn plan_step(&mut self, controller: &WizardController) -> Result<WizardCommand> {
        let Some(step) = controller.current_step_spec() else {
            return Ok(WizardCommand::Cancel);
        };
        match &step.kind {
            StepKind::Form(fields) | StepKind::Open(fields) => {
                for spec in fields {
                    let path = FieldPath::field(spec.key);
                    match self.prompt_field(spec, controller.value(path.clone()))? {
                        Prompted::Value(value) => self.queue_field(path, value),
                        Prompted::Back => return Ok(WizardCommand::Back),
                        Prompted::Quit => return Ok(WizardCommand::Cancel),
                    }
                }
                self.queue.push_back(WizardCommand::Next);
                Ok(self.queue.pop_front().unwrap_or(WizardCommand::Next))
            }
            StepKind::Repeatable(sections) => self.plan_sections(controller, sections),
            StepKind::Selection(spec) => self.plan_selection(controller, spec),
        }
    }

    fn plan_sections(
        &mut self,
        controller: &WizardController,
        sections: &[SectionSpec],
    ) -> Result<WizardCommand> {
        for section in sections {
            for (index, entry) in controller.entries(section.id).iter().enumerate() {
                if !self.visited.insert(entry.id) {
                    continue;
                }
                println!("{}", format!("{} #{}", section.label, index + 1).bold());
                for spec in &section.fields {
                    let path = FieldPath::entry(section.id, entry.id, spec.key);
                    match self.prompt_field(spec, entry.fields.get(spec.key))? {
                        Prompted::Value(value) => self.queue_field(path, value),
                        Prompted::Back => return Ok(WizardCommand::Back),
                        Prompted::Quit => return Ok(WizardCommand::Cancel),
                    }
                }
            }
        }
        if let Some(command) = self.queue.pop_front() {
            return Ok(command);
        }

        let mut items = Vec::new();
        let mut actions = Vec::new();
        for section in sections {
            items.push(format!("Add another {}", section.label.to_lowercase()));
            actions.push(WizardCommand::AddEntry(section.id.to_string()));
            let entries = controller.entries(section.id);
            if let Some(last) = entries.last().filter(|_| entries.len() > 1) {
                items.push(format!("Remove last {}", section.label.to_lowercase()));
                actions.push(WizardCommand::RemoveEntry {
                    section: section.id.to_string(),
                    entry: last.id,
                });
            }
        }
        items.push("Continue".into());
        actions.push(WizardCommand::Next);

        let picked = Select::with_theme(&self.theme)
            .with_prompt("What next? (Esc goes back)")
            .items(&items)
            .default(items.len() - 1)
            .interact_opt()?;
        Ok(picked
            .and_then(|index| actions.get(index).cloned())
            .unwrap_or(WizardCommand::Back))
    }

    fn plan_selection(
        &mut self,
        controller: &WizardController,
        spec: &SelectionSpec,
    ) -> Result<WizardCommand> {
        let Some(chosen) = self.prompt_selection(spec, controller.selection(spec.key))? else {
            return Ok(WizardCommand::Back);
        };
        self.queue_selection(spec, controller.selection(spec.key), &chosen);

        for follow_up in &spec.follow_ups {
            if !chosen.contains(&follow_up.when) {
                continue;
            }
            if let Some(extra) =
                self.prompt_selection(&follow_up.spec, controller.selection(follow_up.spec.key))?
            {
                self.queue_selection(
                    &follow_up.spec,
                    controller.selection(follow_up.spec.key),
                    &extra,
                );
            }
        }
        self.queue.push_back(WizardCommand::Next);
        Ok(self.queue.pop_front().unwrap_or(WizardCommand::Next))
    }

    /// Returns the full set of options the user wants chosen, or `None` to
    /// go back.
    fn prompt_selection(
        &self,
        spec: &SelectionSpec,
        current: Option<&Selection>,
    ) -> Result<Option<Vec<String>>> {
        let chosen = |option: &str| current.is_some_and(|selection| selection.contains(option));

        if spec.options.is_empty() {
            let existing = match current {
                Some(Selection::Multi(values)) => values.iter().cloned().collect::<Vec<_>>(),
                Some(Selection::Single(value)) => value.iter().cloned().collect(),
                None => Vec::new(),
            };
            let raw = Input::<String>::with_theme(&self.theme)
                .with_prompt(format!("{} (comma separated)", spec.label))
                .with_initial_text(existing.join(", "))
                .allow_empty(true)
                .interact_text()?;
            if raw.trim() == ":back" {
                return Ok(None);
            }
            return Ok(Some(
                raw.split(',')
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .collect(),
            ));
        }

        match spec.mode {
            SelectionMode::Single => {
                let default = spec
                    .options
                    .iter()
                    .position(|option| chosen(option))
                    .unwrap_or(0);
                let picked = Select::with_theme(&self.theme)
                    .with_prompt(format!("{} (Esc goes back)", spec.label))
                    .items(&spec.options)
                    .default(default)
                    .interact_opt()?;
                Ok(picked.map(|index| spec.options[index..=index].to_vec()))
            }
            SelectionMode::Multi => {
                let defaults: Vec<bool> = spec.options.iter().map(|o| chosen(o)).collect();
                let picked = MultiSelect::with_theme(&self.theme)
                    .with_prompt(format!("{}s (Space toggles, Esc goes back)", spec.label))
                    .items(&spec.options)
                    .defaults(&defaults)
                    .interact_opt()?;
                Ok(picked.map(|indices| {
                    indices
                        .into_iter()
                        .map(|index| spec.options[index].clone())
                        .collect()
                }))
            }
        }
    }

    fn queue_selection(
        &mut self,
        spec: &SelectionSpec,
        current: Option<&Selection>,
        chosen: &[String],
    ) {
        let key = spec.key.to_string();
        match spec.mode {
            SelectionMode::Single => {
                if let Some(option) = chosen.first() {
                    self.queue.push_back(WizardCommand::Select {
                        key,
                        option: option.clone(),
                    });
                }
            }
            SelectionMode::Multi => {
                let previous: Vec<String> = match current {
                    Some(Selection::Multi(values)) => values.iter().cloned().collect(),
                    _ => Vec::new(),
                };
                let flipped = previous
                    .iter()
                    .filter(|option| !chosen.contains(option))
                    .chain(chosen.iter().filter(|option| !previous.contains(option)));
                for option in flipped {
                    self.queue.push_back(WizardCommand::Toggle {
                        key: key.clone(),
                        option: option.clone(),
                    });
                }
            }
        }
    }

    fn queue_field(&mut self, path: FieldPath, value: FieldValue) {
        self.queue.push_back(WizardCommand::Set {
            path: path.clone(),
            value,
        });
        self.queue.push_back(WizardCommand::Blur(path));
    }

    fn prompt_field(&self, spec: &FieldSpec, current: Option<&FieldValue>) -> Result<Prompted> {
        let label = if spec.requirement == Requirement::Optional {
            format!("{} (optional)", spec.label)
        } else {
            spec.label.to_string()
        };

        match &spec.rule {
            FieldRule::Flag => {
                let answer = Confirm::with_theme(&self.theme)
                    .with_prompt(label)
                    .default(current.is_some_and(FieldValue::as_flag))
                    .interact_opt()?;
                Ok(answer.map_or(Prompted::Back, |flag| Prompted::Value(flag.into())))
            }
            FieldRule::Password(_) => {
                let secret = Password::with_theme(&self.theme)
                    .with_prompt(label)
                    .allow_empty_password(true)
                    .interact()?;
                Ok(Prompted::from_text(secret))
            }
            rule => {
                let initial = current.map(FieldValue::as_text).unwrap_or_default();
                let prompt = if rule.is_date() {
                    format!("{label} [YYYY-MM-DD]")
                } else {
                    label
                };
                let raw = Input::<String>::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .with_initial_text(initial)
                    .allow_empty(true)
                    .interact_text()?;
                Ok(Prompted::from_text(raw))
            }
        }
    }
}

enum Prompted {
    Value(FieldValue),
    Back,
    Quit,
}

impl Prompted {
    fn from_text(raw: String) -> Self {
        match raw.trim() {
            ":back" => Prompted::Back,
            ":quit" => Prompted::Quit,
            "" => Prompted::Value(FieldValue::Empty),
            _ => Prompted::Value(FieldValue::Text(raw)),
        }
    }
}

impl WizardInteraction for TerminalInteraction {
    fn next_command(&mut self, controller: &WizardController) -> WizardCommand {
        if let Some(command) = self.queue.pop_front() {
            return command;
        }
        match self.plan_step(controller) {
            Ok(command @ (WizardCommand::Back | WizardCommand::Cancel)) => {
                self.queue.clear();
                command
            }
            Ok(command) => command,
            Err(err) => {
                error!(error = %err, "terminal prompt failed");
                self.report_error(&err);
                WizardCommand::Cancel
            }
        }
    }

    fn report(&mut self, transition: &Transition, controller: &WizardController) {
        match transition {
            Transition::Moved { to, .. } => {
                self.queue.clear();
                self.visited.clear();
                let title = controller
                    .current_step_spec()
                    .map(|step| step.title)
                    .unwrap_or_default();
                println!();
                println!(
                    "{}",
                    format!("Step {to} of {}: {title}", controller.step_count())
                        .bold()
                        .cyan()
                );
            }
            Transition::Rejected { .. } => {
                self.queue.clear();
                self.visited.clear();
                println!("{}", "Please fix the following before continuing:".yellow());
                for (key, message) in controller.errors().iter() {
                    println!("  {} {}", label_for(controller, key).bold(), message.red());
                }
            }
            Transition::Submit(_) => println!("{}", "Submitting...".dimmed()),
            Transition::Completed(_) => println!("{}", "All done!".green().bold()),
            Transition::Failed { message } => {
                self.queue.clear();
                println!("{} {}", "Submission failed:".red().bold(), message);
            }
            Transition::Exit | Transition::Ignored => {}
        }
    }

    fn report_error(&mut self, error: &WizardError) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }
}

/// Human label for an error key, which is either `field` or `entry:field`.
fn label_for<'a>(controller: &'a WizardController, key: &'a str) -> &'a str {
    let field = key.split_once(':').map_or(key, |(_, field)| field);
    let schema = controller.schema();
    schema
        .fields()
        .chain(schema.sections().flat_map(|section| section.fields.iter()))
        .find(|spec| spec.key == field)
        .map(|spec| spec.label)
        .or_else(|| schema.selection(field).map(|spec| spec.label))
        .unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::SubmissionError;
    use crate::schema::{FieldSpec, SelectionSpec, StepSpec, WizardSchema};
    use crate::time::FixedClock;
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct MockInteraction {
        commands: VecDeque<WizardCommand>,
        transitions: Vec<Transition>,
        errors: Vec<String>,
    }

    impl MockInteraction {
        fn new(commands: Vec<WizardCommand>) -> Self {
            Self {
                commands: commands.into(),
                transitions: Vec::new(),
                errors: Vec::new(),
            }
        }
    }

    impl WizardInteraction for MockInteraction {
        fn next_command(&mut self, _controller: &WizardController) -> WizardCommand {
            self.commands.pop_front().unwrap_or(WizardCommand::Cancel)
        }

        fn report(&mut self, transition: &Transition, _controller: &WizardController) {
            self.transitions.push(transition.clone());
        }

        fn report_error(&mut self, error: &WizardError) {
            self.errors.push(error.to_string());
        }
    }

    fn controller() -> WizardController {
        let schema = WizardSchema::new(
            "demo",
            vec![
                StepSpec::new(
                    "Contact",
                    StepKind::Form(vec![FieldSpec::new("email", "Email", FieldRule::Email)]),
                ),
                StepSpec::new(
                    "Category",
                    StepKind::Selection(SelectionSpec::single(
                        "category",
                        "Category",
                        vec!["music".into(), "sports".into()],
                    )),
                ),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        WizardController::new(schema, Arc::new(FixedClock::new(today)))
    }

    fn set(key: &str, value: &str) -> WizardCommand {
        WizardCommand::Set {
            path: FieldPath::field(key),
            value: value.into(),
        }
    }

    #[test]
    fn wizard_submits_after_all_steps() {
        let mut controller = controller();
        let mut interaction = MockInteraction::new(vec![
            set("email", "ana@example.com"),
            WizardCommand::Next,
            WizardCommand::Select {
                key: "category".into(),
                option: "music".into(),
            },
            WizardCommand::Next,
        ]);
        let mut submitted = 0;
        let mut submitter = |_: &SubmissionPayload| -> std::result::Result<(), SubmissionError> {
            submitted += 1;
            Ok(())
        };

        let outcome = run_wizard(&mut controller, &mut interaction, &mut submitter);
        match outcome {
            WizardOutcome::Submitted(payload) => {
                assert_eq!(payload.text("email"), Some("ana@example.com"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(submitted, 1);
        assert!(interaction.transitions[0].scroll_to_top());
    }

    #[test]
    fn rejected_step_keeps_looping_until_fixed() {
        let mut controller = controller();
        let mut interaction = MockInteraction::new(vec![
            WizardCommand::Next,
            set("email", "ana@example.com"),
            WizardCommand::Next,
            WizardCommand::Cancel,
        ]);
        let mut submitter = |_: &SubmissionPayload| -> std::result::Result<(), SubmissionError> {
            Ok(())
        };

        let outcome = run_wizard(&mut controller, &mut interaction, &mut submitter);
        assert_eq!(outcome, WizardOutcome::Cancelled);
        assert!(matches!(
            interaction.transitions[0],
            Transition::Rejected { step: 1, .. }
        ));
        assert_eq!(
            interaction.transitions[1],
            Transition::Moved { from: 1, to: 2 }
        );
        assert!(controller.errors().is_empty());
    }

    #[test]
    fn back_on_first_step_exits() {
        let mut controller = controller();
        let mut interaction = MockInteraction::new(vec![WizardCommand::Back]);
        let mut submitter = |_: &SubmissionPayload| -> std::result::Result<(), SubmissionError> {
            Ok(())
        };

        let outcome = run_wizard(&mut controller, &mut interaction, &mut submitter);
        assert_eq!(outcome, WizardOutcome::Exited);
        assert_eq!(interaction.transitions, vec![Transition::Exit]);
    }

    #[test]
    fn failed_submission_stays_on_terminal_step() {
        let mut controller = controller();
        let mut interaction = MockInteraction::new(vec![
            set("email", "ana@example.com"),
            WizardCommand::Next,
            WizardCommand::Select {
                key: "category".into(),
                option: "sports".into(),
            },
            WizardCommand::Next,
        ]);
        let mut submitter = |_: &SubmissionPayload| -> std::result::Result<(), SubmissionError> {
            Err(SubmissionError::new("server unavailable"))
        };

        let outcome = run_wizard(&mut controller, &mut interaction, &mut submitter);
        assert_eq!(outcome, WizardOutcome::Cancelled);
        assert_eq!(controller.current_step(), 2);
        assert_eq!(controller.submission_error(), Some("server unavailable"));
        assert!(interaction.transitions.contains(&Transition::Failed {
            message: "server unavailable".into()
        }));
    }

    #[test]
    fn command_errors_are_reported_not_fatal() {
        let mut controller = controller();
        let mut interaction = MockInteraction::new(vec![
            set("nickname", "ana"),
            WizardCommand::Select {
                key: "category".into(),
                option: "chess".into(),
            },
        ]);
        let mut submitter = |_: &SubmissionPayload| -> std::result::Result<(), SubmissionError> {
            Ok(())
        };

        let outcome = run_wizard(&mut controller, &mut interaction, &mut submitter);
        assert_eq!(outcome, WizardOutcome::Cancelled);
        assert_eq!(interaction.errors.len(), 2);
        assert!(interaction.errors[0].contains("nickname"));
    }

    #[test]
    fn error_labels_resolve_entry_keys() {
        let controller = controller();
        assert_eq!(label_for(&controller, "email"), "Email");
        assert_eq!(label_for(&controller, "abc:email"), "Email");
        assert_eq!(label_for(&controller, "category"), "Category");
        assert_eq!(label_for(&controller, "missing"), "missing");
    }
}
