//! Interactive menu shown when `wildfire_risk` runs without a subcommand.
//!
//! Prompts with `dialoguer` for the action and its parameters, then runs
//! the same commands as the headless subcommands.

use std::path::PathBuf;

use dialoguer::{Input, MultiSelect, Select};
use wildfire_risk_dashboard::DashboardConfig;
use wildfire_risk_models::simulation::{DEFAULT_STEPS, DEFAULT_WIND_FACTOR};
use wildfire_risk_models::{EnvironmentalInputs, InputField, Location, Scenario};

use crate::commands;

/// Top-level actions in the interactive menu.
enum Action {
    Dashboard,
    Health,
    Heatmap,
    Predict,
    Scenarios,
    Simulate,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Dashboard,
        Self::Health,
        Self::Heatmap,
        Self::Predict,
        Self::Scenarios,
        Self::Simulate,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Open the dashboard",
            Self::Health => "Check service health",
            Self::Heatmap => "List logged predictions",
            Self::Predict => "Predict risk at a point",
            Self::Scenarios => "Compare scenarios",
            Self::Simulate => "Simulate risk propagation",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if the service URL is missing or invalid, a prompt
/// fails, or the selected action fails.
pub async fn run(api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Wildfire Risk");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let api = crate::connect(api_url)?;

    match Action::ALL[idx] {
        Action::Dashboard => {
            let config = DashboardConfig::embedded()?;
            wildfire_risk_tui::run_dashboard(api, &config).await?;
        }
        Action::Health => {
            let multi = wildfire_risk_cli_utils::init_logger();
            let status = commands::health(api.as_ref(), &multi).await;
            let code = commands::health_exit_code(status);
            if code != 0 {
                std::process::exit(code);
            }
        }
        Action::Heatmap => {
            let limit: usize = Input::new()
                .with_prompt("Max predictions to show")
                .default(20)
                .interact_text()?;
            let multi = wildfire_risk_cli_utils::init_logger();
            commands::heatmap(api.as_ref(), &multi, limit).await?;
        }
        Action::Predict => {
            let location = prompt_location()?;
            let inputs = prompt_inputs()?;
            let multi = wildfire_risk_cli_utils::init_logger();
            commands::predict(api.as_ref(), &multi, location, inputs).await?;
        }
        Action::Scenarios => {
            let labels: Vec<String> = Scenario::all().iter().map(|s| s.label()).collect();
            let defaults = vec![true; labels.len()];
            let picked = MultiSelect::new()
                .with_prompt("Scenarios (space=toggle, a=all, enter=confirm)")
                .items(&labels)
                .defaults(&defaults)
                .interact()?;

            if picked.is_empty() {
                println!("No scenarios selected.");
                return Ok(());
            }

            let scenarios: Vec<Scenario> = picked.iter().map(|&i| Scenario::all()[i]).collect();
            let multi = wildfire_risk_cli_utils::init_logger();
            commands::scenarios(api.as_ref(), &multi, &scenarios).await;
        }
        Action::Simulate => {
            let grid_file: String = Input::new()
                .with_prompt("Grid JSON file")
                .interact_text()?;
            let wind_factor: f64 = Input::new()
                .with_prompt("Wind factor")
                .default(DEFAULT_WIND_FACTOR)
                .interact_text()?;
            let steps: u32 = Input::new()
                .with_prompt("Steps")
                .default(DEFAULT_STEPS)
                .interact_text()?;
            let multi = wildfire_risk_cli_utils::init_logger();
            commands::simulate(
                api.as_ref(),
                &multi,
                &PathBuf::from(grid_file),
                wind_factor,
                steps,
            )
            .await?;
        }
    }

    Ok(())
}

fn prompt_location() -> Result<Location, dialoguer::Error> {
    let lat: f64 = Input::new()
        .with_prompt("Latitude")
        .validate_with(|v: &f64| {
            if (-90.0..=90.0).contains(v) {
                Ok(())
            } else {
                Err("latitude must be between -90 and 90")
            }
        })
        .interact_text()?;
    let lng: f64 = Input::new()
        .with_prompt("Longitude")
        .validate_with(|v: &f64| {
            if (-180.0..=180.0).contains(v) {
                Ok(())
            } else {
                Err("longitude must be between -180 and 180")
            }
        })
        .interact_text()?;
    Ok(Location::new(lat, lng))
}

fn prompt_inputs() -> Result<EnvironmentalInputs, dialoguer::Error> {
    let mut inputs = EnvironmentalInputs::default();
    for field in InputField::all() {
        let range = field.range();
        let value: u8 = Input::new()
            .with_prompt(format!(
                "{} ({}-{}{})",
                field.label(),
                range.start(),
                range.end(),
                field.unit()
            ))
            .default(inputs.get(*field))
            .interact_text()?;
        inputs.set(*field, value);
    }
    Ok(inputs)
}
