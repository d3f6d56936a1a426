#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! UI-independent core of the wildfire risk dashboard.
//!
//! [`Dashboard`] owns every piece of session state: the selected location,
//! slider inputs, heatmap points, the current prediction and the scenario
//! comparison list. Network workflows never touch it directly. They run as
//! spawned tasks against a [`wildfire_risk_client::RiskApi`] and report
//! back as [`DashboardEvent`]s, which the owner folds in with
//! [`Dashboard::apply`]. [`Dispatcher`] wires the two halves together.
//!
//! Everything a renderer needs (heat layer, trend series, result panel,
//! map viewport) is derived here so the terminal front end stays a thin
//! drawing layer.

pub mod config;
pub mod dispatch;
pub mod health;
pub mod heat;
pub mod heatmap;
pub mod map;
pub mod prediction;
pub mod scenario;
pub mod state;
pub mod trend;
pub mod view;

use tokio::sync::mpsc;
use wildfire_risk_models::{Driver, RiskPoint, Scenario, ScenarioResult};

pub use config::{ConfigError, DashboardConfig};
pub use dispatch::Dispatcher;
pub use health::HealthStatus;
pub use prediction::PredictionRejected;
pub use scenario::ScenarioRejected;
pub use state::Dashboard;

/// Completion reports from workflow tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// The startup health probe finished.
    HealthChecked(HealthStatus),
    /// A heatmap fetch succeeded.
    HeatmapLoaded {
        /// Fetch sequence number.
        seq: u64,
        /// Every logged prediction.
        points: Vec<RiskPoint>,
    },
    /// A heatmap fetch failed.
    HeatmapFailed {
        /// Fetch sequence number.
        seq: u64,
    },
    /// The predict call of a prediction cycle succeeded.
    PredictionScored {
        /// Prediction generation the response belongs to.
        generation: u64,
        /// Model output in `[0, 1]`.
        probability: f64,
    },
    /// The explain call of a prediction cycle succeeded.
    DriversExplained {
        /// Prediction generation the response belongs to.
        generation: u64,
        /// Feature contributions.
        drivers: Vec<Driver>,
    },
    /// A prediction cycle ended, successfully or not.
    PredictionFinished {
        /// Prediction generation that finished.
        generation: u64,
        /// Whether both predict and explain succeeded, in which case the
        /// service has logged a new point.
        refresh_heatmap: bool,
    },
    /// A scenario evaluation succeeded.
    ScenarioScored(ScenarioResult),
    /// A scenario evaluation ended, successfully or not.
    ScenarioFinished {
        /// Scenario that finished.
        scenario: Scenario,
    },
}

/// Work the state owner asks for after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Fetch the heatmap again.
    RefreshHeatmap,
}

/// Sending half of the event channel, cloned into every workflow task.
pub type EventSender = mpsc::UnboundedSender<DashboardEvent>;

/// Receiving half of the event channel, held by the event loop.
pub type EventReceiver = mpsc::UnboundedReceiver<DashboardEvent>;

/// Creates the workflow event channel.
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Sends an event, logging instead of failing when the receiver is gone
/// (the dashboard is shutting down).
pub(crate) fn emit(events: &EventSender, event: DashboardEvent) {
    if let Err(e) = events.send(event) {
        log::debug!("Dashboard closed, dropping {:?}", e.0);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`RiskApi`] that records calls and plays back scripted
    //! responses.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use wildfire_risk_client::{ClientError, RiskApi};
    use wildfire_risk_models::api::{RiskRequest, SimulationRequest};
    use wildfire_risk_models::{Driver, RiskPoint, Scenario, ScenarioResult};

    /// A recorded call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Health,
        Heatmap,
        Predict(RiskRequest),
        Explain(RiskRequest),
        Scenario(Scenario),
        Simulate,
    }

    /// Scripted outcome: `Ok(value)` or a failure with the given HTTP status.
    pub type Outcome<T> = Result<T, u16>;

    #[derive(Default)]
    pub struct FakeApi {
        pub calls: Mutex<Vec<Call>>,
        pub health: Mutex<VecDeque<Outcome<()>>>,
        pub heatmap: Mutex<VecDeque<Outcome<Vec<RiskPoint>>>>,
        pub predict: Mutex<VecDeque<Outcome<f64>>>,
        pub explain: Mutex<VecDeque<Outcome<Vec<Driver>>>>,
        pub scenarios: Mutex<VecDeque<Outcome<ScenarioResult>>>,
    }

    impl FakeApi {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn script_predict(&self, outcome: Outcome<f64>) -> &Self {
            self.predict.lock().unwrap().push_back(outcome);
            self
        }

        pub fn script_explain(&self, outcome: Outcome<Vec<Driver>>) -> &Self {
            self.explain.lock().unwrap().push_back(outcome);
            self
        }

        pub fn script_heatmap(&self, outcome: Outcome<Vec<RiskPoint>>) -> &Self {
            self.heatmap.lock().unwrap().push_back(outcome);
            self
        }

        pub fn script_health(&self, outcome: Outcome<()>) -> &Self {
            self.health.lock().unwrap().push_back(outcome);
            self
        }

        pub fn script_scenario(&self, outcome: Outcome<ScenarioResult>) -> &Self {
            self.scenarios.lock().unwrap().push_back(outcome);
            self
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn play<T>(queue: &Mutex<VecDeque<Outcome<T>>>, url: &str) -> Result<T, ClientError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(500))
            .map_err(|status| ClientError::Status {
                status,
                url: url.to_string(),
            })
    }

    #[async_trait::async_trait]
    impl RiskApi for FakeApi {
        async fn system_health(&self) -> Result<(), ClientError> {
            self.record(Call::Health);
            play(&self.health, "system-health")
        }

        async fn risk_heatmap(&self) -> Result<Vec<RiskPoint>, ClientError> {
            self.record(Call::Heatmap);
            play(&self.heatmap, "risk-heatmap")
        }

        async fn predict_risk(&self, request: &RiskRequest) -> Result<f64, ClientError> {
            self.record(Call::Predict(*request));
            play(&self.predict, "predict-risk")
        }

        async fn explain_risk(&self, request: &RiskRequest) -> Result<Vec<Driver>, ClientError> {
            self.record(Call::Explain(*request));
            play(&self.explain, "explain-risk")
        }

        async fn predict_scenario(
            &self,
            scenario: Scenario,
        ) -> Result<ScenarioResult, ClientError> {
            self.record(Call::Scenario(scenario));
            play(&self.scenarios, "predict-scenario")
        }

        async fn simulate_risk(
            &self,
            _request: &SimulationRequest,
        ) -> Result<Vec<Vec<f64>>, ClientError> {
            self.record(Call::Simulate);
            Err(ClientError::Status {
                status: 501,
                url: "simulate-risk".to_string(),
            })
        }
    }

    /// Drains every event currently queued on the channel.
    pub fn drain(events: &mut super::EventReceiver) -> Vec<super::DashboardEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }
}
