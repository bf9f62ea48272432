//! Personal info onboarding: basics, education and roles, skills, goals.

use wizard_config::ValidationConfig;

use crate::flows::{age_range, owned};
use crate::schema::{
    FieldRule, FieldSpec, SectionSpec, SelectionSpec, StepKind, StepSpec, WizardSchema,
};
use crate::validation::NameRule;

pub const FLOW: &str = "personal_info";

pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const MOBILE: &str = "mobile";
pub const DATE_OF_BIRTH: &str = "date_of_birth";
pub const BIO: &str = "bio";

pub const EDUCATION: &str = "education";
pub const INSTITUTION: &str = "institution";
pub const DEGREE: &str = "degree";
pub const FIELD_OF_STUDY: &str = "field_of_study";
pub const CURRENTLY_ENROLLED: &str = "currently_enrolled";

pub const ROLES: &str = "roles";
pub const ORGANIZATION: &str = "organization";
pub const TITLE: &str = "title";
pub const CURRENTLY_WORKING: &str = "currently_working";

pub const START_YEAR: &str = "start_year";
pub const END_YEAR: &str = "end_year";

pub const SKILLS: &str = "skills";
pub const GOALS: &str = "goals";

/// Choices offered on the selection steps.
#[derive(Debug, Clone)]
pub struct PersonalInfoOptions {
    pub skills: Vec<String>,
    pub goals: Vec<String>,
}

impl Default for PersonalInfoOptions {
    fn default() -> Self {
        Self {
            skills: owned(&[
                "Design",
                "Engineering",
                "Marketing",
                "Music",
                "Photography",
                "Writing",
            ]),
            goals: owned(&[
                "Discover events",
                "Find collaborators",
                "Grow my network",
                "Learn new skills",
            ]),
        }
    }
}

pub fn schema(config: &ValidationConfig, options: PersonalInfoOptions) -> WizardSchema {
    let min = config.year_min;

    let basics = StepKind::Form(vec![
        FieldSpec::new(
            NAME,
            "Name",
            FieldRule::Name(NameRule::new("Name", config.person_name_min)),
        ),
        FieldSpec::new(EMAIL, "Email", FieldRule::Email),
        FieldSpec::new(
            MOBILE,
            "Mobile number",
            FieldRule::Mobile {
                digits: config.mobile_digits,
            },
        ),
        FieldSpec::new(
            DATE_OF_BIRTH,
            "Date of birth",
            FieldRule::DateOfBirth(age_range(config)),
        ),
        FieldSpec::new(BIO, "Bio", FieldRule::MaxLength(config.description_max)).optional(),
    ]);

    let education = SectionSpec::new(
        EDUCATION,
        "Education",
        vec![
            FieldSpec::new(INSTITUTION, "Institution", FieldRule::Text),
            FieldSpec::new(DEGREE, "Degree", FieldRule::Text),
            FieldSpec::new(FIELD_OF_STUDY, "Field of study", FieldRule::Text).optional(),
            FieldSpec::new(START_YEAR, "Start year", FieldRule::Year { min }),
            FieldSpec::new(
                END_YEAR,
                "End year",
                FieldRule::YearAfter {
                    start: START_YEAR,
                    min,
                },
            )
            .unless_flag(CURRENTLY_ENROLLED),
            FieldSpec::new(CURRENTLY_ENROLLED, "Currently enrolled", FieldRule::Flag).optional(),
        ],
    );

    let roles = SectionSpec::new(
        ROLES,
        "Role",
        vec![
            FieldSpec::new(ORGANIZATION, "Organization", FieldRule::Text),
            FieldSpec::new(TITLE, "Title", FieldRule::Text),
            FieldSpec::new(START_YEAR, "Start year", FieldRule::Year { min }),
            FieldSpec::new(
                END_YEAR,
                "End year",
                FieldRule::YearAfter {
                    start: START_YEAR,
                    min,
                },
            )
            .unless_flag(CURRENTLY_WORKING),
            FieldSpec::new(CURRENTLY_WORKING, "Currently working here", FieldRule::Flag)
                .optional(),
        ],
    );

    WizardSchema::new(
        FLOW,
        vec![
            StepSpec::new("Basic information", basics),
            StepSpec::new(
                "Education & experience",
                StepKind::Repeatable(vec![education, roles]),
            ),
            StepSpec::new(
                "Skills & interests",
                StepKind::Selection(SelectionSpec::multi(SKILLS, "Skill", options.skills)),
            ),
            StepSpec::new(
                "Goals",
                StepKind::Selection(SelectionSpec::multi(GOALS, "Goal", options.goals)),
            ),
        ],
    )
}
