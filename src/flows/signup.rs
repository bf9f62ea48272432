use wizard_config::ValidationConfig;

use crate::assembler::SubmissionPayload;
use crate::flows::personal_info;
use crate::form::FieldValue;
use crate::schema::{FieldRule, FieldSpec, StepKind, StepSpec, WizardSchema};
use crate::validation::NameRule;

pub const FLOW: &str = "signup";

pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const MOBILE: &str = "mobile";
pub const PASSWORD: &str = "password";

pub fn schema(config: &ValidationConfig) -> WizardSchema {
    WizardSchema::new(
        FLOW,
        vec![StepSpec::new(
            "Create your account",
            StepKind::Form(vec![
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
                    PASSWORD,
                    "Password",
                    FieldRule::Password(config.password.clone()),
                ),
            ]),
        )],
    )
}

/// Identity details forwarded from signup into the personal info flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupCarryOver {
    pub name: String,
    pub email: String,
    pub mobile: String,
}

impl SignupCarryOver {
    pub fn from_payload(payload: &SubmissionPayload) -> Self {
        let text = |key: &str| payload.text(key).unwrap_or_default().to_string();
        Self {
            name: text(NAME),
            email: text(EMAIL),
            mobile: text(MOBILE),
        }
    }

    pub fn into_prefill(self) -> Vec<(&'static str, FieldValue)> {
        [
            (personal_info::NAME, self.name),
            (personal_info::EMAIL, self.email),
            (personal_info::MOBILE, self.mobile),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key, FieldValue::Text(value)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::PayloadValue;

    #[test]
    fn carry_over_skips_missing_values() {
        let mut payload = SubmissionPayload::default();
        payload
            .fields
            .insert(NAME.into(), PayloadValue::Text("Ana".into()));
        payload
            .fields
            .insert(EMAIL.into(), PayloadValue::Text("ana@example.com".into()));

        let carry = SignupCarryOver::from_payload(&payload);
        assert_eq!(carry.mobile, "");
        let prefill = carry.into_prefill();
        assert_eq!(prefill.len(), 2);
        assert_eq!(prefill[0], (personal_info::NAME, FieldValue::from("Ana")));
    }
}
