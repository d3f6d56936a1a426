#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the wildfire risk toolchain.
//!
//! ```text
//! wildfire_risk dashboard [--config dashboard.toml]
//! wildfire_risk health
//! wildfire_risk heatmap [--limit 20]
//! wildfire_risk predict --lat 51.45 --lng -2.59 [--temperature 30] [--humidity 40] [--wind-speed 15]
//! wildfire_risk scenario heatwave high_wind
//! wildfire_risk simulate --grid-file grid.json [--wind-factor 1.0] [--steps 3]
//! ```
//!
//! Running `wildfire_risk` with no subcommand enters interactive mode.
//!
//! The service base URL comes from `WILDFIRE_API_URL` unless `--api-url`
//! is given. Headless commands log through
//! [`wildfire_risk_cli_utils::init_logger`]; the dashboard installs its own
//! logger that writes into the event-log pane.

mod commands;
mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use wildfire_risk_client::{ApiConfig, ClientError, HttpRiskApi, RiskApi};
use wildfire_risk_dashboard::DashboardConfig;
use wildfire_risk_models::{Location, Scenario};
use wildfire_risk_models::simulation::{DEFAULT_STEPS, DEFAULT_WIND_FACTOR};

#[derive(Parser)]
#[command(
    name = "wildfire_risk",
    about = "Wildfire risk dashboard and service queries"
)]
struct Cli {
    /// Base URL of the risk service (overrides `WILDFIRE_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive terminal dashboard
    Dashboard {
        /// Dashboard TOML file (defaults to the built-in configuration)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Check whether the risk service is reachable
    Health,
    /// List the most recent logged predictions
    Heatmap {
        /// Maximum number of predictions to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Predict and explain the risk at a point
    Predict {
        /// Latitude (WGS84)
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude (WGS84)
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Temperature in °C (0-50)
        #[arg(long)]
        temperature: Option<u8>,
        /// Relative humidity in % (0-100)
        #[arg(long)]
        humidity: Option<u8>,
        /// Wind speed in km/h (0-50)
        #[arg(long)]
        wind_speed: Option<u8>,
    },
    /// Evaluate canned scenarios concurrently
    Scenario {
        /// Scenario names (baseline, heatwave, `high_wind`, decarbonised)
        #[arg(required = true)]
        names: Vec<Scenario>,
    },
    /// Run the grid propagation simulation
    Simulate {
        /// JSON file holding a rectangular grid of values in [0, 1]
        #[arg(long)]
        grid_file: PathBuf,
        /// Wind multiplier applied to spread probability
        #[arg(long, default_value_t = DEFAULT_WIND_FACTOR)]
        wind_factor: f64,
        /// Number of propagation steps
        #[arg(long, default_value_t = DEFAULT_STEPS)]
        steps: u32,
    },
}

/// Resolves the service configuration and builds the HTTP client.
fn connect(api_url: Option<&str>) -> Result<Arc<dyn RiskApi>, ClientError> {
    let config = ApiConfig::resolve(api_url)?;
    log::debug!("Using risk service at {}", config.base_url());
    Ok(Arc::new(HttpRiskApi::new(config)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(cli.api_url.as_deref()).await;
    };

    // Fail fast on a missing or malformed base URL before anything else.
    let api = connect(cli.api_url.as_deref())?;

    match command {
        Commands::Dashboard { config } => {
            let config = DashboardConfig::load(config.as_deref())?;
            wildfire_risk_tui::run_dashboard(api, &config).await?;
        }
        Commands::Health => {
            let multi = wildfire_risk_cli_utils::init_logger();
            let status = commands::health(api.as_ref(), &multi).await;
            let code = commands::health_exit_code(status);
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Heatmap { limit } => {
            let multi = wildfire_risk_cli_utils::init_logger();
            commands::heatmap(api.as_ref(), &multi, limit).await?;
        }
        Commands::Predict {
            lat,
            lng,
            temperature,
            humidity,
            wind_speed,
        } => {
            let multi = wildfire_risk_cli_utils::init_logger();
            let inputs = commands::inputs(temperature, humidity, wind_speed);
            commands::predict(api.as_ref(), &multi, Location::new(lat, lng), inputs).await?;
        }
        Commands::Scenario { names } => {
            let multi = wildfire_risk_cli_utils::init_logger();
            commands::scenarios(api.as_ref(), &multi, &names).await;
        }
        Commands::Simulate {
            grid_file,
            wind_factor,
            steps,
        } => {
            let multi = wildfire_risk_cli_utils::init_logger();
            commands::simulate(api.as_ref(), &multi, &grid_file, wind_factor, steps).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("wildfire_risk").chain(args.iter().copied()))
    }

    #[test]
    fn scenario_names_parse_by_wire_name() {
        let cli = parse(&["scenario", "high_wind", "heatwave"]).unwrap();

        let Some(Commands::Scenario { names }) = cli.command else {
            panic!("expected the scenario command");
        };
        assert_eq!(names, vec![Scenario::HighWind, Scenario::Heatwave]);
    }

    #[test]
    fn unknown_scenario_is_rejected() {
        assert!(parse(&["scenario", "drought"]).is_err());
        assert!(parse(&["scenario"]).is_err());
    }

    #[test]
    fn negative_coordinates_and_global_url() {
        let cli = parse(&[
            "predict",
            "--lat",
            "-33.9",
            "--lng",
            "-2.59",
            "--api-url",
            "http://localhost:5000",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:5000"));
        let Some(Commands::Predict { lat, lng, .. }) = cli.command else {
            panic!("expected the predict command");
        };
        assert!((lat + 33.9).abs() < f64::EPSILON);
        assert!((lng + 2.59).abs() < f64::EPSILON);
    }
}
