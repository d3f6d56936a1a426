//! The dashboard state owner.

use wildfire_risk_models::{EnvironmentalInputs, InputField, Location, RiskPoint, Scenario};

use crate::config::DashboardConfig;
use crate::health::HealthStatus;
use crate::heat::{self, HeatLayerStyle, HeatPoint};
use crate::heatmap::{HeatmapTicket, HeatmapTracker};
use crate::map::MapViewport;
use crate::prediction::{PredictionRejected, PredictionTicket, PredictionTracker};
use crate::scenario::{ScenarioBoard, ScenarioRejected};
use crate::trend::{self, TrendPoint};
use crate::view::{self, ResultView, ScenarioRow};
use crate::{DashboardEvent, FollowUp};

/// All session state of one dashboard.
///
/// Only this type mutates state. Workflows receive tickets from the
/// `begin_*` methods and report back through [`Self::apply`].
#[derive(Debug, Clone)]
pub struct Dashboard {
    viewport: MapViewport,
    inputs: EnvironmentalInputs,
    location: Option<Location>,
    health: HealthStatus,
    points: Vec<RiskPoint>,
    heat_layer: Option<Vec<HeatPoint>>,
    heat_style: HeatLayerStyle,
    heatmap: HeatmapTracker,
    prediction: PredictionTracker,
    scenarios: ScenarioBoard,
}

impl Dashboard {
    /// Creates an empty session from `config`.
    #[must_use]
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            viewport: MapViewport::new(config.map_center(), config.map.zoom),
            inputs: config.inputs,
            location: None,
            health: HealthStatus::Checking,
            points: Vec::new(),
            heat_layer: None,
            heat_style: config.heat.clone(),
            heatmap: HeatmapTracker::default(),
            prediction: PredictionTracker::default(),
            scenarios: ScenarioBoard::default(),
        }
    }

    /// Picks the point to predict for. Responses to earlier requests are
    /// ignored from now on.
    pub fn select_location(&mut self, location: Location) {
        log::info!("Selected {location}");
        self.location = Some(location);
        self.prediction.invalidate();
    }

    /// Nudges one slider, clamped to its range.
    pub fn adjust_input(&mut self, field: InputField, delta: i16) {
        self.inputs.adjust(field, delta);
    }

    /// Starts a prediction cycle for the selected location.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionRejected`] if no location is selected or a cycle
    /// is already running.
    pub fn begin_prediction(&mut self) -> Result<PredictionTicket, PredictionRejected> {
        let ticket = self.prediction.begin(self.location, &self.inputs)?;
        log::info!(
            "Running model for {} (generation {})",
            Location::new(ticket.request.latitude, ticket.request.longitude),
            ticket.generation
        );
        Ok(ticket)
    }

    /// Starts a heatmap fetch.
    pub const fn begin_heatmap(&mut self) -> HeatmapTicket {
        self.heatmap.begin()
    }

    /// Starts a scenario evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioRejected`] if the scenario is already running.
    pub fn begin_scenario(&mut self, scenario: Scenario) -> Result<(), ScenarioRejected> {
        self.scenarios.begin(scenario)
    }

    /// Folds a workflow event into the state.
    pub fn apply(&mut self, event: DashboardEvent) -> Option<FollowUp> {
        match event {
            DashboardEvent::HealthChecked(status) => {
                self.health = status;
            }
            DashboardEvent::HeatmapLoaded { seq, points } => {
                if self.heatmap.accept(seq) {
                    self.heat_layer = heat::normalize(&points);
                    self.points = points;
                } else {
                    log::debug!("Discarding out-of-order heatmap #{seq}");
                }
            }
            DashboardEvent::HeatmapFailed { seq } => {
                self.heatmap.fail(seq);
            }
            DashboardEvent::PredictionScored {
                generation,
                probability,
            } => {
                self.prediction.scored(generation, probability);
            }
            DashboardEvent::DriversExplained {
                generation,
                drivers,
            } => {
                self.prediction.explained(generation, drivers);
            }
            DashboardEvent::PredictionFinished {
                generation,
                refresh_heatmap,
            } => {
                self.prediction.finished(generation);
                // The service logged a point even if the result is stale.
                if refresh_heatmap {
                    return Some(FollowUp::RefreshHeatmap);
                }
            }
            DashboardEvent::ScenarioScored(result) => {
                self.scenarios.record(result);
            }
            DashboardEvent::ScenarioFinished { scenario } => {
                self.scenarios.finish(scenario);
            }
        }
        None
    }

    /// Map viewport.
    #[must_use]
    pub const fn viewport(&self) -> &MapViewport {
        &self.viewport
    }

    /// Mutable map viewport, for panning and zooming.
    pub const fn viewport_mut(&mut self) -> &mut MapViewport {
        &mut self.viewport
    }

    /// Slider values.
    #[must_use]
    pub const fn inputs(&self) -> &EnvironmentalInputs {
        &self.inputs
    }

    /// Selected location, if any.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        self.location
    }

    /// Service health.
    #[must_use]
    pub const fn health(&self) -> HealthStatus {
        self.health
    }

    /// Logged predictions from the latest applied heatmap.
    #[must_use]
    pub fn points(&self) -> &[RiskPoint] {
        &self.points
    }

    /// Normalized heat layer, or `None` when there are no points.
    #[must_use]
    pub fn heat_layer(&self) -> Option<&[HeatPoint]> {
        self.heat_layer.as_deref()
    }

    /// Heat layer style.
    #[must_use]
    pub const fn heat_style(&self) -> &HeatLayerStyle {
        &self.heat_style
    }

    /// Trend series, or `None` when there are no points.
    #[must_use]
    pub fn trend(&self) -> Option<Vec<TrendPoint>> {
        trend::trend_series(&self.points)
    }

    /// Whether a heatmap fetch is outstanding.
    #[must_use]
    pub const fn is_heatmap_loading(&self) -> bool {
        self.heatmap.is_loading()
    }

    /// Whether a prediction cycle is in flight.
    #[must_use]
    pub const fn is_predicting(&self) -> bool {
        self.prediction.is_running()
    }

    /// Latest probability, if any.
    #[must_use]
    pub const fn probability(&self) -> Option<f64> {
        self.prediction.probability()
    }

    /// Result panel contents.
    #[must_use]
    pub fn result_view(&self) -> ResultView {
        ResultView::new(
            self.prediction.is_running(),
            self.prediction.probability(),
            self.prediction.drivers(),
        )
    }

    /// Whether `scenario` is being evaluated.
    #[must_use]
    pub fn is_scenario_running(&self, scenario: Scenario) -> bool {
        self.scenarios.is_running(scenario)
    }

    /// Scenario comparison rows.
    #[must_use]
    pub fn scenario_rows(&self) -> Vec<ScenarioRow> {
        view::scenario_rows(self.scenarios.results())
    }
}
