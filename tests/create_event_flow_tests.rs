mod common;

use std::sync::Arc;

use common::{clock, create_event_controller, rules};
use wizard_core::{
    flows::create_event::{self, *},
    form::Selection,
    preferences::{InMemoryPreferences, PreferencesRepository},
    SubmissionPayload, Transition, WizardController, WizardError,
};

fn fill_details(controller: &mut WizardController) {
    for (key, value) in [
        (EVENT_NAME, "Summer Jam"),
        (HOST_NAME, "Ana"),
        (DESCRIPTION, "  Live music by the river  "),
        (LOCATION, "Lisbon"),
        (START_DATE, "2025-07-10"),
        (END_DATE, "July 12, 2025"),
    ] {
        controller.set_field(key, value).unwrap();
    }
}

/// Walks the wizard to the terminal thumbnail step.
fn at_thumbnail(controller: &mut WizardController, event_type: &str) {
    controller.select(CATEGORY, "Music").unwrap();
    assert_eq!(controller.advance(), Transition::Moved { from: 1, to: 2 });
    fill_details(controller);
    assert_eq!(controller.advance(), Transition::Moved { from: 2, to: 3 });
    controller.select(EVENT_TYPE, event_type).unwrap();
    assert_eq!(controller.advance(), Transition::Moved { from: 3, to: 4 });
}

fn submit(controller: &mut WizardController) -> SubmissionPayload {
    match controller.advance() {
        Transition::Submit(payload) => payload,
        other => panic!("expected submission, got {other:?}"),
    }
}

#[test]
fn category_step_requires_a_choice() {
    let mut controller = create_event_controller();
    assert!(matches!(
        controller.advance(),
        Transition::Rejected { step: 1, .. }
    ));
    assert_eq!(
        controller.errors().get(CATEGORY),
        Some("Please choose a category")
    );

    let err = controller.select(CATEGORY, "Knitting").unwrap_err();
    assert!(matches!(err, WizardError::InvalidOption { .. }));
    controller.select(CATEGORY, "Sports").unwrap();
    assert!(controller.errors().is_empty());
}

#[test]
fn event_names_and_host_names_use_their_own_minimums() {
    let mut controller = create_event_controller();
    controller.set_field(EVENT_NAME, "Jam").unwrap();
    controller.set_field(HOST_NAME, "Al").unwrap();
    assert!(controller.blur_field(EVENT_NAME).unwrap().is_valid);
    assert!(controller.blur_field(HOST_NAME).unwrap().is_valid);

    controller.set_field(EVENT_NAME, "Ja").unwrap();
    let outcome = controller.blur_field(EVENT_NAME).unwrap();
    assert_eq!(
        outcome.message(),
        Some("Event name is too short (minimum 3 characters)")
    );
}

#[test]
fn end_date_before_start_is_rejected() {
    let mut controller = create_event_controller();
    controller.set_field(START_DATE, "2025-07-10").unwrap();
    controller.set_field(END_DATE, "2025-07-09").unwrap();
    let outcome = controller.blur_field(END_DATE).unwrap();
    assert_eq!(
        outcome.message(),
        Some("End date cannot be before start date")
    );

    controller.set_field(START_DATE, "2025-07-01").unwrap();
    assert!(!controller.errors().has_error(END_DATE));
}

#[test]
fn long_description_blocks_details_step() {
    let mut controller = create_event_controller();
    controller.select(CATEGORY, "Music").unwrap();
    controller.advance();
    fill_details(&mut controller);
    controller
        .set_field(DESCRIPTION, "x".repeat(rules().description_max + 1))
        .unwrap();

    let Transition::Rejected { invalid, .. } = controller.advance() else {
        panic!("description is too long");
    };
    assert_eq!(invalid, vec![DESCRIPTION]);
    assert_eq!(
        controller.errors().get(DESCRIPTION),
        Some("Description cannot exceed 500 characters")
    );
}

#[test]
fn private_event_without_invitees_still_advances() {
    let mut controller = create_event_controller();
    at_thumbnail(&mut controller, PRIVATE);
    assert_eq!(controller.current_step(), 4);
    assert!(controller.errors().is_empty());
}

#[test]
fn invitees_are_dropped_when_event_becomes_public() {
    let mut controller = create_event_controller();
    controller.toggle_selection(INVITEES, "friend-1").unwrap();
    at_thumbnail(&mut controller, PUBLIC);

    let payload = submit(&mut controller);
    assert!(!payload.selections.contains_key(INVITEES));
    assert_eq!(payload.text(END_DATE), Some("2025-07-12"));
}

#[test]
fn thumbnail_step_never_blocks_submission() {
    let mut controller = create_event_controller();
    at_thumbnail(&mut controller, PUBLIC);
    assert!(controller.is_current_step_valid());
    let payload = submit(&mut controller);
    assert!(!payload.fields.contains_key(THUMBNAIL));
}

#[test]
fn details_edited_after_passing_block_submission() {
    let mut controller = create_event_controller();
    at_thumbnail(&mut controller, PUBLIC);
    controller.set_field(EVENT_NAME, "A").unwrap();
    controller.set_field(END_DATE, "2020-01-01").unwrap();

    assert!(matches!(
        controller.advance(),
        Transition::Rejected { step: 2, .. }
    ));
    assert_eq!(controller.current_step(), 2);
    assert!(!controller.is_submitting());
    assert!(controller.errors().has_error(EVENT_NAME));
    assert_eq!(
        controller.errors().get(END_DATE),
        Some("End date cannot be before start date")
    );

    controller.set_field(EVENT_NAME, "Summer Jam").unwrap();
    controller.set_field(END_DATE, "2025-07-12").unwrap();
    assert_eq!(controller.advance(), Transition::Moved { from: 2, to: 3 });
}

#[test]
fn deselected_category_blocks_submission() {
    let mut controller = create_event_controller();
    at_thumbnail(&mut controller, PUBLIC);
    controller.toggle_selection(CATEGORY, "Music").unwrap();

    assert!(matches!(
        controller.advance(),
        Transition::Rejected { step: 1, .. }
    ));
    assert_eq!(controller.current_step(), 1);
    assert_eq!(
        controller.errors().get(CATEGORY),
        Some("Please choose a category")
    );
}

#[test]
fn private_event_payload_shape() {
    let mut controller = create_event_controller();
    at_thumbnail(&mut controller, PRIVATE);
    controller.toggle_selection(INVITEES, "carla").unwrap();
    controller.toggle_selection(INVITEES, "bob").unwrap();

    let payload = submit(&mut controller);
    insta::assert_snapshot!(payload.to_json().unwrap(), @r###"
    {
      "flow": "create_event",
      "fields": {
        "description": "Live music by the river",
        "end_date": "2025-07-12",
        "event_name": "Summer Jam",
        "host_name": "Ana",
        "location": "Lisbon",
        "start_date": "2025-07-10"
      },
      "selections": {
        "category": "Music",
        "event_type": "private",
        "invitees": [
          "bob",
          "carla"
        ]
      }
    }
    "###);
}

#[test]
fn category_is_remembered_after_success() {
    let preferences = Arc::new(InMemoryPreferences::new());

    let mut first = create_event_controller().with_preferences(preferences.clone());
    at_thumbnail(&mut first, PUBLIC);
    let mut accept = |_: &SubmissionPayload| -> Result<(), wizard_core::SubmissionError> { Ok(()) };
    assert!(matches!(
        first.submit_with(&mut accept),
        Transition::Completed(_)
    ));

    let stored = preferences.load(create_event::FLOW).unwrap().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored.get(CATEGORY),
        Some(&Selection::Single(Some("Music".into())))
    );

    let second = WizardController::new(
        create_event::schema(&rules(), create_event::default_categories()),
        clock(),
    )
    .with_preferences(preferences);
    assert_eq!(
        second.selection(CATEGORY),
        Some(&Selection::Single(Some("Music".into())))
    );
    assert!(second.is_current_step_valid());
}

#[test]
fn failed_submission_does_not_remember_category() {
    let preferences = Arc::new(InMemoryPreferences::new());
    let mut controller = create_event_controller().with_preferences(preferences.clone());
    at_thumbnail(&mut controller, PUBLIC);
    let mut reject = |_: &SubmissionPayload| -> Result<(), wizard_core::SubmissionError> {
        Err(wizard_core::SubmissionError::new("Event service unavailable"))
    };
    controller.submit_with(&mut reject);
    assert!(preferences.load(create_event::FLOW).unwrap().is_none());
}
