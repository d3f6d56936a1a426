#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the wildfire risk service.
//!
//! The dashboard talks to the service exclusively through the [`RiskApi`]
//! trait. [`HttpRiskApi`] is the `reqwest` implementation; tests substitute
//! in-memory fakes. The base URL is resolved once at startup into an
//! [`ApiConfig`] and a missing or malformed URL is a startup error.
//!
//! | Call | Endpoint |
//! |---|---|
//! | health | `GET /system-health` |
//! | heatmap | `GET /risk-heatmap` |
//! | predict | `POST /predict-risk` |
//! | explain | `POST /explain-risk` |
//! | scenario | `POST /predict-scenario` |
//! | simulate | `POST /simulate-risk` |

pub mod config;
pub mod http;

use thiserror::Error;
use wildfire_risk_models::api::{RiskRequest, SimulationRequest};
use wildfire_risk_models::{Driver, RiskPoint, Scenario, ScenarioResult, SimulationGrid};

pub use config::{API_URL_ENV, ApiConfig};
pub use http::HttpRiskApi;

/// Service endpoint paths, relative to the configured base URL.
pub mod endpoints {
    /// `GET`: any 2xx means the service is up.
    pub const SYSTEM_HEALTH: &str = "system-health";
    /// `GET`: every logged prediction.
    pub const RISK_HEATMAP: &str = "risk-heatmap";
    /// `POST`: point prediction.
    pub const PREDICT_RISK: &str = "predict-risk";
    /// `POST`: point explanation.
    pub const EXPLAIN_RISK: &str = "explain-risk";
    /// `POST`: canned scenario prediction.
    pub const PREDICT_SCENARIO: &str = "predict-scenario";
    /// `POST`: grid propagation simulation.
    pub const SIMULATE_RISK: &str = "simulate-risk";
}

/// Errors from risk service calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, TLS, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// A simulation grid failed validation before sending.
    #[error("Invalid simulation grid: {0}")]
    InvalidGrid(#[from] wildfire_risk_models::InvalidGridError),
}

/// Operations offered by the remote risk service.
#[async_trait::async_trait]
pub trait RiskApi: Send + Sync {
    /// Probes service health.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any transport failure or non-2xx status.
    async fn system_health(&self) -> Result<(), ClientError>;

    /// Fetches every logged prediction for the heat layer and trend chart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is malformed.
    async fn risk_heatmap(&self) -> Result<Vec<RiskPoint>, ClientError>;

    /// Predicts the risk probability for a point.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is malformed.
    async fn predict_risk(&self, request: &RiskRequest) -> Result<f64, ClientError>;

    /// Explains a prediction as per-feature contributions.
    ///
    /// A response without contributions yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is malformed.
    async fn explain_risk(&self, request: &RiskRequest) -> Result<Vec<Driver>, ClientError>;

    /// Evaluates a canned scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is malformed.
    async fn predict_scenario(&self, scenario: Scenario) -> Result<ScenarioResult, ClientError>;

    /// Runs the grid propagation simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is malformed.
    async fn simulate_risk(&self, request: &SimulationRequest)
    -> Result<Vec<Vec<f64>>, ClientError>;
}

/// Validates a raw grid and wraps it in a simulation request.
///
/// # Errors
///
/// Returns [`ClientError::InvalidGrid`] if the grid is empty, ragged, or
/// holds a value outside `[0, 1]`.
pub fn simulation_request(
    rows: Vec<Vec<f64>>,
    wind_factor: f64,
    steps: u32,
) -> Result<SimulationRequest, ClientError> {
    Ok(SimulationRequest {
        grid: SimulationGrid::new(rows)?,
        wind_factor,
        steps,
    })
}
