//! Request and response bodies for the remote risk service.
//!
//! Field names follow the service's `snake_case` JSON contract.

use serde::{Deserialize, Serialize};

use crate::simulation::{DEFAULT_STEPS, DEFAULT_WIND_FACTOR, SimulationGrid};
use crate::{Driver, RiskPoint, Scenario, ScenarioResult};

/// Body of `POST /predict-risk` and `POST /explain-risk`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskRequest {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Latitude of the selected point.
    pub latitude: f64,
    /// Longitude of the selected point.
    pub longitude: f64,
}

/// Response from `POST /predict-risk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Model output in `[0, 1]`.
    pub risk_probability: f64,
    /// Server-side coarse label. Ignored by the dashboard, which applies
    /// its own three-tier classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

/// Response from `POST /explain-risk`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExplainResponse {
    /// Per-feature contributions; absent or `null` means none.
    #[serde(default)]
    pub feature_contributions: Option<Vec<Driver>>,
}

impl ExplainResponse {
    /// Contributions, defaulting to an empty list.
    #[must_use]
    pub fn into_drivers(self) -> Vec<Driver> {
        self.feature_contributions.unwrap_or_default()
    }
}

/// Response from `GET /risk-heatmap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapResponse {
    /// Every logged prediction, oldest first.
    pub results: Vec<RiskPoint>,
}

/// Body of `POST /predict-scenario`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    /// Scenario to evaluate.
    pub scenario: Scenario,
}

/// Response from `POST /predict-scenario`.
///
/// The service echoes the scenario name verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResponse {
    /// Echoed scenario name.
    pub scenario: String,
    /// Model output in `[0, 1]`.
    pub risk_probability: f64,
}

impl ScenarioResponse {
    /// Attaches the response to the scenario that was requested.
    #[must_use]
    pub fn into_result(self, requested: Scenario) -> ScenarioResult {
        ScenarioResult {
            scenario: requested,
            risk_probability: self.risk_probability,
        }
    }
}

/// Body of `POST /simulate-risk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Initial cell risk values.
    pub grid: SimulationGrid,
    /// Multiplier on spread probability.
    pub wind_factor: f64,
    /// Number of propagation steps.
    pub steps: u32,
}

impl SimulationRequest {
    /// Creates a request with the default wind factor and step count.
    #[must_use]
    pub const fn new(grid: SimulationGrid) -> Self {
        Self {
            grid,
            wind_factor: DEFAULT_WIND_FACTOR,
            steps: DEFAULT_STEPS,
        }
    }
}

/// Response from `POST /simulate-risk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    /// Grid after propagation.
    pub simulation_result: Vec<Vec<f64>>,
}
