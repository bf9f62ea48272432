use std::{env, process, sync::Arc};

use colored::Colorize;
use tracing::warn;
use wizard_config::{Config, ConfigManager};

use wizard_core::{
    flows::{
        create_event,
        personal_info::{self, PersonalInfoOptions},
        signup::{self, SignupCarryOver},
    },
    init,
    interaction::{run_wizard, TerminalInteraction, WizardOutcome},
    preferences::InMemoryPreferences,
    time::{Clock, SystemClock},
    SubmissionError, SubmissionPayload, WizardController, WizardSchema,
};

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let flow = env::args().nth(1).unwrap_or_else(|| {
        print_usage();
        process::exit(1);
    });

    let config = load_config();
    if !config.ui_color_enabled {
        colored::control::set_override(false);
    }
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rules = &config.validation;

    match flow.as_str() {
        "signup" => {
            run_flow(WizardController::new(signup::schema(rules), clock))?;
        }
        "personal-info" => {
            let schema = personal_info::schema(rules, PersonalInfoOptions::default());
            run_flow(WizardController::new(schema, clock))?;
        }
        "create-event" => {
            let schema = create_event::schema(rules, create_event::default_categories());
            let controller = WizardController::new(schema, clock)
                .with_preferences(Arc::new(InMemoryPreferences::default()));
            run_flow(controller)?;
        }
        "onboarding" => {
            let account = WizardController::new(signup::schema(rules), clock.clone());
            let Some(payload) = run_flow(account)? else {
                return Ok(());
            };
            let schema = personal_info::schema(rules, PersonalInfoOptions::default());
            let controller = WizardController::new(schema, clock)
                .with_prefill(SignupCarryOver::from_payload(&payload).into_prefill())?;
            run_flow(controller)?;
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}

fn load_config() -> Config {
    let loaded = ConfigManager::default_location().and_then(|manager| manager.load());
    loaded.unwrap_or_else(|err| {
        warn!(error = %err, "using default configuration");
        Config::default()
    })
}

fn run_flow(
    mut controller: WizardController,
) -> Result<Option<SubmissionPayload>, Box<dyn std::error::Error>> {
    let schema: &WizardSchema = controller.schema();
    if let Some(first) = schema.step(1) {
        println!(
            "{}",
            format!("Step 1 of {}: {}", schema.len(), first.title)
                .bold()
                .cyan()
        );
    }

    let mut interaction = TerminalInteraction::new();
    let mut submitter = |payload: &SubmissionPayload| -> Result<(), SubmissionError> {
        let json = payload
            .to_json()
            .map_err(|err| SubmissionError::new(err.to_string()))?;
        println!("{json}");
        Ok(())
    };

    match run_wizard(&mut controller, &mut interaction, &mut submitter) {
        WizardOutcome::Submitted(payload) => Ok(Some(payload)),
        WizardOutcome::Exited | WizardOutcome::Cancelled => {
            println!("{}", "Wizard closed without submitting.".dimmed());
            Ok(None)
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage: wizard_cli <flow>\n\
         Flows:\n  \
         signup\n  \
         personal-info\n  \
         create-event\n  \
         onboarding   (signup, then personal info prefilled)"
    );
}
