//! Event creation: category, details, type (with optional invitees for
//! private events) and an ungated thumbnail step.

use wizard_config::ValidationConfig;

use crate::flows::owned;
use crate::schema::{FieldRule, FieldSpec, SelectionSpec, StepKind, StepSpec, WizardSchema};
use crate::validation::NameRule;

pub const FLOW: &str = "create_event";

pub const CATEGORY: &str = "category";
pub const EVENT_NAME: &str = "event_name";
pub const HOST_NAME: &str = "host_name";
pub const DESCRIPTION: &str = "description";
pub const LOCATION: &str = "location";
pub const START_DATE: &str = "start_date";
pub const END_DATE: &str = "end_date";
pub const EVENT_TYPE: &str = "event_type";
pub const INVITEES: &str = "invitees";
pub const THUMBNAIL: &str = "thumbnail";

pub const PUBLIC: &str = "public";
pub const PRIVATE: &str = "private";

pub fn default_categories() -> Vec<String> {
    owned(&["Arts", "Food & drink", "Music", "Networking", "Outdoors", "Sports"])
}

pub fn schema(config: &ValidationConfig, categories: Vec<String>) -> WizardSchema {
    let details = StepKind::Form(vec![
        FieldSpec::new(
            EVENT_NAME,
            "Event name",
            FieldRule::Name(NameRule::new("Event name", config.event_name_min)),
        ),
        FieldSpec::new(
            HOST_NAME,
            "Host name",
            FieldRule::Name(NameRule::new("Host name", config.host_name_min)),
        ),
        FieldSpec::new(
            DESCRIPTION,
            "Description",
            FieldRule::MaxLength(config.description_max),
        )
        .optional(),
        FieldSpec::new(LOCATION, "Location", FieldRule::Text),
        FieldSpec::new(START_DATE, "Start date", FieldRule::Date),
        FieldSpec::new(END_DATE, "End date", FieldRule::DateAfter { start: START_DATE }),
    ]);

    // Invitees are open-ended friend ids and never gate the step.
    let event_type = SelectionSpec::single(EVENT_TYPE, "Event type", owned(&[PUBLIC, PRIVATE]))
        .with_follow_up(PRIVATE, SelectionSpec::multi(INVITEES, "Friend", Vec::new()));

    WizardSchema::new(
        FLOW,
        vec![
            StepSpec::new(
                "Choose a category",
                StepKind::Selection(
                    SelectionSpec::single(CATEGORY, "Category", categories).remembered(),
                ),
            ),
            StepSpec::new("Event details", details),
            StepSpec::new("Event type", StepKind::Selection(event_type)),
            StepSpec::new(
                "Thumbnail",
                StepKind::Open(vec![
                    FieldSpec::new(THUMBNAIL, "Thumbnail", FieldRule::Text).optional()
                ]),
            ),
        ],
    )
}
