//! Spawns workflow tasks on behalf of the state owner.

use std::sync::Arc;

use tokio::task::JoinHandle;
use wildfire_risk_client::RiskApi;
use wildfire_risk_models::Scenario;

use crate::prediction::PredictionRejected;
use crate::scenario::ScenarioRejected;
use crate::state::Dashboard;
use crate::{DashboardEvent, EventSender, FollowUp, health, heatmap, prediction, scenario};

/// Starts workflows against the service. Results come back on the event
/// channel the dispatcher was created with.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn RiskApi>,
    events: EventSender,
}

impl Dispatcher {
    /// Creates a dispatcher reporting to `events`.
    #[must_use]
    pub fn new(api: Arc<dyn RiskApi>, events: EventSender) -> Self {
        Self { api, events }
    }

    /// Startup work: one health probe and the initial heatmap fetch.
    pub fn start(&self, dashboard: &mut Dashboard) {
        self.probe_health();
        self.refresh_heatmap(dashboard);
    }

    /// Probes service health.
    pub fn probe_health(&self) -> JoinHandle<()> {
        let (api, events) = (self.api.clone(), self.events.clone());
        tokio::spawn(async move { health::probe(api.as_ref(), &events).await })
    }

    /// Fetches the heatmap.
    pub fn refresh_heatmap(&self, dashboard: &mut Dashboard) -> JoinHandle<()> {
        let ticket = dashboard.begin_heatmap();
        let (api, events) = (self.api.clone(), self.events.clone());
        tokio::spawn(async move { heatmap::load(api.as_ref(), ticket, &events).await })
    }

    /// Runs the model for the selected location.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionRejected`] without making any request if no
    /// location is selected or a prediction is already running.
    pub fn predict(
        &self,
        dashboard: &mut Dashboard,
    ) -> Result<JoinHandle<()>, PredictionRejected> {
        let ticket = dashboard.begin_prediction()?;
        let (api, events) = (self.api.clone(), self.events.clone());
        Ok(tokio::spawn(async move {
            prediction::run(api.as_ref(), ticket, &events).await;
        }))
    }

    /// Evaluates a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioRejected`] if the scenario is already running.
    pub fn run_scenario(
        &self,
        dashboard: &mut Dashboard,
        scenario: Scenario,
    ) -> Result<JoinHandle<()>, ScenarioRejected> {
        dashboard.begin_scenario(scenario)?;
        log::info!("Running scenario {scenario}");
        let (api, events) = (self.api.clone(), self.events.clone());
        Ok(tokio::spawn(async move {
            scenario::run(api.as_ref(), scenario, &events).await;
        }))
    }

    /// Applies a workflow event and starts any follow-up work it asks for.
    pub fn handle(&self, dashboard: &mut Dashboard, event: DashboardEvent) {
        if let Some(FollowUp::RefreshHeatmap) = dashboard.apply(event) {
            self.refresh_heatmap(dashboard);
        }
    }
}
