#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use wizard_config::{ConfigManager, ValidationConfig};
use wizard_core::{
    flows::{
        create_event,
        personal_info::{self, PersonalInfoOptions},
        signup,
    },
    time::{Clock, FixedClock},
    EntryId, FieldPath, Transition, WizardController,
};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(today()))
}

/// Creates a config manager backed by a unique directory for each test.
pub fn config_manager() -> ConfigManager {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    ConfigManager::with_base_dir(base).expect("create config manager for temp dir")
}

pub fn rules() -> ValidationConfig {
    ValidationConfig::default()
}

pub fn signup_controller() -> WizardController {
    WizardController::new(signup::schema(&rules()), clock())
}

pub fn personal_info_controller() -> WizardController {
    let schema = personal_info::schema(&rules(), PersonalInfoOptions::default());
    WizardController::new(schema, clock())
}

/// Personal info wizard with valid basics, sitting on the experience step.
pub fn experience_step() -> WizardController {
    let mut controller = personal_info_controller();
    for (key, value) in [
        (personal_info::NAME, "Ana Silva"),
        (personal_info::EMAIL, "ana@example.com"),
        (personal_info::MOBILE, "555-123-4567"),
        (personal_info::DATE_OF_BIRTH, "1990-04-12"),
    ] {
        controller.set_field(key, value).expect("set basics");
    }
    assert_eq!(controller.advance(), Transition::Moved { from: 1, to: 2 });
    controller
}

pub fn create_event_controller() -> WizardController {
    let schema = create_event::schema(&rules(), create_event::default_categories());
    WizardController::new(schema, clock())
}

pub fn first_entry(controller: &WizardController, section: &str) -> EntryId {
    controller.entries(section)[0].id
}

pub fn at(section: &str, entry: EntryId, field: &str) -> FieldPath {
    FieldPath::entry(section, entry, field)
}

pub fn fill_education(controller: &mut WizardController, entry: EntryId) {
    use personal_info::*;
    for (field, value) in [
        (INSTITUTION, "Lisbon University"),
        (DEGREE, "BSc"),
        (START_YEAR, "2015"),
        (END_YEAR, "2019"),
    ] {
        controller
            .set_field(at(EDUCATION, entry, field), value)
            .expect("set education field");
    }
}

pub fn fill_role(controller: &mut WizardController, entry: EntryId) {
    use personal_info::*;
    for (field, value) in [
        (ORGANIZATION, "Acme"),
        (TITLE, "Engineer"),
        (START_YEAR, "2019"),
    ] {
        controller
            .set_field(at(ROLES, entry, field), value)
            .expect("set role field");
    }
    controller
        .set_field(at(ROLES, entry, CURRENTLY_WORKING), true)
        .expect("set role flag");
}
