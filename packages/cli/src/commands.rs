//! Headless service queries.
//!
//! Each command awaits its requests behind a spinner and prints a plain
//! text report. Presentation goes through the same view models as the
//! dashboard, so tiers, percentages and driver rounding always agree.

use std::path::Path;

use futures::future::join_all;
use wildfire_risk_cli_utils::{MultiProgress, RequestSpinner, with_spinner};
use wildfire_risk_client::{ClientError, RiskApi};
use wildfire_risk_dashboard::HealthStatus;
use wildfire_risk_dashboard::heat::normalize;
use wildfire_risk_dashboard::view::{RiskSummary, scenario_rows};
use wildfire_risk_models::{
    EnvironmentalInputs, InputField, Location, RiskPoint, Scenario, ScenarioResult,
    format_probability,
};

/// Timestamp format for logged predictions.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Slider values for a prediction, falling back to the dashboard defaults
/// for any value not given. Values are clamped into the slider ranges.
#[must_use]
pub fn inputs(
    temperature: Option<u8>,
    humidity: Option<u8>,
    wind_speed: Option<u8>,
) -> EnvironmentalInputs {
    let defaults = EnvironmentalInputs::default();
    EnvironmentalInputs::new(
        temperature.unwrap_or(defaults.temperature),
        humidity.unwrap_or(defaults.humidity),
        wind_speed.unwrap_or(defaults.wind_speed),
    )
}

/// Probes the service once and prints its status.
pub async fn health(api: &dyn RiskApi, multi: &MultiProgress) -> HealthStatus {
    let outcome = with_spinner(multi, "Checking risk service", api.system_health()).await;
    let status = HealthStatus::from_outcome(&outcome);
    println!("Risk service is {status}");
    status
}

/// Process exit code for a health check: zero only when operational.
#[must_use]
pub const fn health_exit_code(status: HealthStatus) -> i32 {
    if status.is_operational() { 0 } else { 1 }
}

/// Prints the newest `limit` logged predictions.
///
/// # Errors
///
/// Returns [`ClientError`] if the heatmap request fails.
pub async fn heatmap(
    api: &dyn RiskApi,
    multi: &MultiProgress,
    limit: usize,
) -> Result<(), ClientError> {
    let points = with_spinner(multi, "Fetching logged predictions", api.risk_heatmap()).await?;

    if points.is_empty() {
        println!("No logged predictions yet.");
        return Ok(());
    }

    for line in heatmap_table(&points, limit) {
        println!("{line}");
    }
    println!(
        "\n{} logged prediction(s), showing {}",
        points.len(),
        limit.min(points.len())
    );
    Ok(())
}

/// Table of the newest `limit` points, newest first, with their heat layer
/// intensity.
fn heatmap_table(points: &[RiskPoint], limit: usize) -> Vec<String> {
    let intensities = normalize(points).unwrap_or_default();

    let mut lines = vec![
        format!(
            "{:<20} {:>10} {:>10} {:>8} {:<7} {:>9}",
            "CREATED", "LAT", "LNG", "RISK", "LEVEL", "INTENSITY"
        ),
        "-".repeat(69),
    ];
    lines.extend(
        points
            .iter()
            .zip(intensities)
            .rev()
            .take(limit)
            .map(|(point, heat)| {
                format!(
                    "{:<20} {:>10.4} {:>10.4} {:>8} {:<7} {:>9.3}",
                    point.created_at.format(CREATED_AT_FORMAT).to_string(),
                    point.latitude,
                    point.longitude,
                    format_probability(point.risk_probability),
                    point.level().label(),
                    heat.intensity,
                )
            }),
    );
    lines
}

/// Predicts and explains the risk at `location`.
///
/// An explanation failure is logged and the prediction is still reported
/// without drivers.
///
/// # Errors
///
/// Returns [`ClientError`] if the prediction request fails.
pub async fn predict(
    api: &dyn RiskApi,
    multi: &MultiProgress,
    location: Location,
    inputs: EnvironmentalInputs,
) -> Result<(), ClientError> {
    let request = inputs.to_request(location);
    let probability = with_spinner(multi, "Running model", api.predict_risk(&request)).await?;

    let drivers =
        match with_spinner(multi, "Explaining prediction", api.explain_risk(&request)).await {
            Ok(drivers) => drivers,
            Err(e) => {
                log::error!("Explain error: {e}");
                Vec::new()
            }
        };

    let summary = RiskSummary::new(probability, &drivers);
    print!("{}", prediction_report(location, &inputs, &summary));
    Ok(())
}

fn prediction_report(
    location: Location,
    inputs: &EnvironmentalInputs,
    summary: &RiskSummary,
) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "{location}");
    for field in InputField::all() {
        let _ = writeln!(out, "{}: {}", field.label(), inputs.display(*field));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Risk: {} ({})", summary.percent, summary.level.label());
    let _ = writeln!(out, "{}", summary.advisory());

    if !summary.drivers.is_empty() {
        let _ = writeln!(out, "\nFeature drivers:");
        for driver in &summary.drivers {
            let _ = writeln!(out, "  {:<20} {:+.4}", driver.feature, driver.contribution);
        }
    }
    out
}

/// Evaluates `scenarios` concurrently and prints the comparison.
pub async fn scenarios(api: &dyn RiskApi, multi: &MultiProgress, scenarios: &[Scenario]) {
    let spinner = RequestSpinner::start(
        multi,
        &format!("Evaluating {} scenario(s)", scenarios.len()),
    );
    let results = run_scenarios(api, scenarios).await;
    spinner.clear();

    if results.is_empty() {
        println!("No scenario results.");
        return;
    }
    for row in scenario_rows(&results) {
        println!("{:<14} {:>8}  {}", row.label, row.percent, row.level.label());
    }
}

/// Issues one request per distinct scenario, all in flight at once.
/// Failures are logged and left out of the result, which keeps the order
/// the scenarios were first named in.
async fn run_scenarios(api: &dyn RiskApi, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
    let mut distinct: Vec<Scenario> = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        if !distinct.contains(scenario) {
            distinct.push(*scenario);
        }
    }

    let outcomes = join_all(distinct.iter().map(|s| api.predict_scenario(*s))).await;

    distinct
        .into_iter()
        .zip(outcomes)
        .filter_map(|(scenario, outcome)| match outcome {
            Ok(result) => Some(result),
            Err(e) => {
                log::error!("Scenario {scenario} error: {e}");
                None
            }
        })
        .collect()
}

/// Runs the grid propagation simulation on the grid stored in `grid_file`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the grid is
/// invalid, or the request fails.
pub async fn simulate(
    api: &dyn RiskApi,
    multi: &MultiProgress,
    grid_file: &Path,
    wind_factor: f64,
    steps: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = read_grid(grid_file)?;
    let request = wildfire_risk_client::simulation_request(rows, wind_factor, steps)?;
    let (height, width) = request.grid.dimensions();
    log::info!("Simulating {height}x{width} grid, wind factor {wind_factor}, {steps} step(s)");

    let result = with_spinner(multi, "Simulating propagation", api.simulate_risk(&request)).await?;
    println!("{}", grid_table(&result));
    Ok(())
}

fn read_grid(path: &Path) -> Result<Vec<Vec<f64>>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn grid_table(rows: &[Vec<f64>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|v| format!("{v:.3}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{TimeZone as _, Utc};
    use indicatif::ProgressDrawTarget;
    use wildfire_risk_models::api::{RiskRequest, SimulationRequest};
    use wildfire_risk_models::{Driver, RiskLevel};

    use super::*;

    /// Predicts 0.75 everywhere, cannot explain, and fails `high_wind`.
    #[derive(Default)]
    struct StubApi {
        scenarios: Mutex<Vec<Scenario>>,
        offline: bool,
    }

    #[async_trait::async_trait]
    impl RiskApi for StubApi {
        async fn system_health(&self) -> Result<(), ClientError> {
            if self.offline {
                return Err(ClientError::Status {
                    status: 503,
                    url: "system-health".to_string(),
                });
            }
            Ok(())
        }

        async fn risk_heatmap(&self) -> Result<Vec<RiskPoint>, ClientError> {
            Ok(Vec::new())
        }

        async fn predict_risk(&self, _: &RiskRequest) -> Result<f64, ClientError> {
            Ok(0.75)
        }

        async fn explain_risk(&self, _: &RiskRequest) -> Result<Vec<Driver>, ClientError> {
            Err(ClientError::Status {
                status: 500,
                url: "explain-risk".to_string(),
            })
        }

        async fn predict_scenario(&self, scenario: Scenario) -> Result<ScenarioResult, ClientError> {
            self.scenarios.lock().unwrap().push(scenario);
            if scenario == Scenario::HighWind {
                return Err(ClientError::Status {
                    status: 503,
                    url: "predict-scenario".to_string(),
                });
            }
            Ok(ScenarioResult {
                scenario,
                risk_probability: 0.5,
            })
        }

        async fn simulate_risk(
            &self,
            request: &SimulationRequest,
        ) -> Result<Vec<Vec<f64>>, ClientError> {
            Ok(request.grid.rows().to_vec())
        }
    }

    fn hidden() -> MultiProgress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn point(minute: u32, probability: f64) -> RiskPoint {
        RiskPoint::new(
            51.0,
            -2.5,
            probability,
            Utc.with_ymd_and_hms(2025, 7, 1, 12, minute, 0).unwrap(),
        )
    }

    #[test]
    fn inputs_fall_back_to_defaults_and_clamp() {
        let inputs = inputs(Some(80), None, Some(5));
        assert_eq!(inputs, EnvironmentalInputs::new(50, 40, 5));
    }

    #[test]
    fn heatmap_table_lists_newest_first() {
        let points = vec![point(0, 0.2), point(1, 0.8), point(2, 0.4)];
        let lines = heatmap_table(&points, 2);

        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2025-07-01 12:02:00"));
        assert!(lines[2].contains("40.00%"));
        assert!(lines[2].contains("0.500"));
        assert!(lines[3].contains("80.00%"));
        assert!(lines[3].contains(RiskLevel::High.label()));
        assert!(lines[3].ends_with("1.000"));
    }

    #[test]
    fn report_includes_tier_advisory_and_drivers() {
        let drivers = vec![Driver {
            feature: "wind_speed".to_string(),
            contribution: -0.123_46,
        }];
        let summary = RiskSummary::new(0.75, &drivers);
        let report = prediction_report(
            Location::new(51.4545, -2.5879),
            &EnvironmentalInputs::default(),
            &summary,
        );

        assert!(report.starts_with("Lat: 51.4545, Lng: -2.5879\n"));
        assert!(report.contains("Risk: 75.00% (HIGH)"));
        assert!(report.contains(RiskLevel::High.advisory()));
        assert!(report.contains("wind_speed"));
        assert!(report.contains("-0.1235"));
    }

    #[tokio::test]
    async fn health_exit_code_follows_status() {
        let up = health(&StubApi::default(), &hidden()).await;
        assert_eq!(up, HealthStatus::Operational);
        assert_eq!(health_exit_code(up), 0);

        let api = StubApi {
            offline: true,
            ..StubApi::default()
        };
        let down = health(&api, &hidden()).await;
        assert_eq!(down, HealthStatus::Offline);
        assert_eq!(health_exit_code(down), 1);
    }

    #[tokio::test]
    async fn predict_survives_explain_failure() {
        let api = StubApi::default();
        let result = predict(
            &api,
            &hidden(),
            Location::new(51.0, -2.5),
            EnvironmentalInputs::default(),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn scenarios_are_deduplicated_and_failures_dropped() {
        let api = StubApi::default();
        let results = run_scenarios(
            &api,
            &[
                Scenario::Heatwave,
                Scenario::HighWind,
                Scenario::Heatwave,
                Scenario::Baseline,
            ],
        )
        .await;

        assert_eq!(
            api.scenarios.lock().unwrap().as_slice(),
            &[Scenario::Heatwave, Scenario::HighWind, Scenario::Baseline]
        );
        let evaluated: Vec<Scenario> = results.iter().map(|r| r.scenario).collect();
        assert_eq!(evaluated, vec![Scenario::Heatwave, Scenario::Baseline]);
    }

    #[tokio::test]
    async fn simulate_rejects_ragged_grid_file() {
        let path = std::env::temp_dir().join(format!(
            "wildfire_risk_ragged_grid_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "[[0.1, 0.2], [0.3]]").unwrap();

        let err = simulate(&StubApi::default(), &hidden(), &path, 1.0, 3)
            .await
            .unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(err.to_string().contains("rectangular"));
    }

    #[test]
    fn grid_table_formats_three_decimals() {
        assert_eq!(
            grid_table(&[vec![0.1, 0.25], vec![1.0, 0.0]]),
            "0.100 0.250\n1.000 0.000"
        );
    }
}
