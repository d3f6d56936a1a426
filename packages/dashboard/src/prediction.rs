//! The predict-then-explain workflow.
//!
//! A cycle posts the inputs and selected location to the predict endpoint
//! and, only if that succeeds, posts the same payload to the explain
//! endpoint. Every cycle ends with a [`DashboardEvent::PredictionFinished`]
//! whatever happened before, so the running flag always clears.
//!
//! Responses are tagged with a generation. Starting a cycle or selecting a
//! different location advances the generation, and responses tagged with
//! an older one are ignored.

use thiserror::Error;
use wildfire_risk_client::RiskApi;
use wildfire_risk_models::api::RiskRequest;
use wildfire_risk_models::{Driver, EnvironmentalInputs, Location};

use crate::{DashboardEvent, EventSender, emit};

/// Why a prediction could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PredictionRejected {
    /// No location has been picked on the map.
    #[error("Please select a location on the map first.")]
    NoLocationSelected,
    /// A cycle is already in flight.
    #[error("A prediction is already running.")]
    AlreadyRunning,
}

/// A started cycle, handed to [`run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionTicket {
    /// Generation the responses will be tagged with.
    pub generation: u64,
    /// Payload for both calls.
    pub request: RiskRequest,
}

/// Prediction state owned by the dashboard.
#[derive(Debug, Clone, Default)]
pub struct PredictionTracker {
    generation: u64,
    in_flight: Option<u64>,
    probability: Option<f64>,
    drivers: Vec<Driver>,
}

impl PredictionTracker {
    /// Starts a cycle: clears the previous result and enters the running
    /// state.
    ///
    /// # Errors
    ///
    /// * [`PredictionRejected::AlreadyRunning`] if a cycle is in flight.
    /// * [`PredictionRejected::NoLocationSelected`] if `location` is `None`.
    pub fn begin(
        &mut self,
        location: Option<Location>,
        inputs: &EnvironmentalInputs,
    ) -> Result<PredictionTicket, PredictionRejected> {
        if self.in_flight.is_some() {
            return Err(PredictionRejected::AlreadyRunning);
        }
        let location = location.ok_or(PredictionRejected::NoLocationSelected)?;

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.probability = None;
        self.drivers.clear();

        Ok(PredictionTicket {
            generation: self.generation,
            request: inputs.to_request(location),
        })
    }

    /// Marks every outstanding response as stale.
    pub const fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Records a probability if it belongs to the current generation.
    pub fn scored(&mut self, generation: u64, probability: f64) -> bool {
        if generation != self.generation {
            log::debug!("Discarding stale prediction (generation {generation})");
            return false;
        }
        self.probability = Some(probability);
        true
    }

    /// Records drivers if they belong to the current generation.
    pub fn explained(&mut self, generation: u64, drivers: Vec<Driver>) -> bool {
        if generation != self.generation {
            log::debug!("Discarding stale explanation (generation {generation})");
            return false;
        }
        self.drivers = drivers;
        true
    }

    /// Leaves the running state if `generation` is the cycle in flight.
    pub fn finished(&mut self, generation: u64) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }
    }

    /// Whether a cycle is in flight.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Latest probability, if any.
    #[must_use]
    pub const fn probability(&self) -> Option<f64> {
        self.probability
    }

    /// Latest feature contributions.
    #[must_use]
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }
}

/// Runs one cycle and always reports its end.
pub async fn run(api: &dyn RiskApi, ticket: PredictionTicket, events: &EventSender) {
    let refresh_heatmap = score(api, &ticket, events).await;
    emit(
        events,
        DashboardEvent::PredictionFinished {
            generation: ticket.generation,
            refresh_heatmap,
        },
    );
}

/// Returns `true` when both calls succeeded.
async fn score(api: &dyn RiskApi, ticket: &PredictionTicket, events: &EventSender) -> bool {
    let generation = ticket.generation;

    let probability = match api.predict_risk(&ticket.request).await {
        Ok(p) => p,
        Err(e) => {
            log::error!("Prediction error: {e}");
            return false;
        }
    };
    emit(
        events,
        DashboardEvent::PredictionScored {
            generation,
            probability,
        },
    );

    match api.explain_risk(&ticket.request).await {
        Ok(drivers) => {
            emit(
                events,
                DashboardEvent::DriversExplained {
                    generation,
                    drivers,
                },
            );
            true
        }
        Err(e) => {
            log::error!("Explanation error: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeApi, drain};

    fn bristol() -> Location {
        Location::new(51.4545, -2.5879)
    }

    #[test]
    fn needs_a_location() {
        let mut tracker = PredictionTracker::default();
        let err = tracker
            .begin(None, &EnvironmentalInputs::default())
            .unwrap_err();
        assert_eq!(err, PredictionRejected::NoLocationSelected);
        assert_eq!(err.to_string(), "Please select a location on the map first.");
        assert!(!tracker.is_running());
    }

    #[test]
    fn rejects_duplicate_submission() {
        let mut tracker = PredictionTracker::default();
        let inputs = EnvironmentalInputs::default();
        tracker.begin(Some(bristol()), &inputs).unwrap();
        assert_eq!(
            tracker.begin(Some(bristol()), &inputs).unwrap_err(),
            PredictionRejected::AlreadyRunning
        );
    }

    #[test]
    fn begin_clears_previous_result() {
        let mut tracker = PredictionTracker::default();
        let inputs = EnvironmentalInputs::default();
        let ticket = tracker.begin(Some(bristol()), &inputs).unwrap();
        tracker.scored(ticket.generation, 0.3);
        tracker.finished(ticket.generation);

        tracker.begin(Some(bristol()), &inputs).unwrap();
        assert_eq!(tracker.probability(), None);
        assert!(tracker.drivers().is_empty());
    }

    #[test]
    fn stale_responses_are_ignored_but_running_clears() {
        let mut tracker = PredictionTracker::default();
        let ticket = tracker
            .begin(Some(bristol()), &EnvironmentalInputs::default())
            .unwrap();
        tracker.invalidate();

        assert!(!tracker.scored(ticket.generation, 0.9));
        assert!(!tracker.explained(ticket.generation, Vec::new()));
        assert_eq!(tracker.probability(), None);

        tracker.finished(ticket.generation);
        assert!(!tracker.is_running());
    }

    #[tokio::test]
    async fn success_reports_probability_drivers_and_refresh() {
        let api = FakeApi::default();
        let drivers = vec![Driver {
            feature: "temperature".to_string(),
            contribution: 0.31,
        }];
        api.script_predict(Ok(0.82)).script_explain(Ok(drivers.clone()));
        let (tx, mut rx) = crate::channel();

        let mut tracker = PredictionTracker::default();
        let ticket = tracker
            .begin(Some(bristol()), &EnvironmentalInputs::default())
            .unwrap();
        run(&api, ticket, &tx).await;

        assert_eq!(
            api.calls(),
            vec![Call::Predict(ticket.request), Call::Explain(ticket.request)]
        );
        assert_eq!(
            drain(&mut rx),
            vec![
                DashboardEvent::PredictionScored {
                    generation: 1,
                    probability: 0.82
                },
                DashboardEvent::DriversExplained {
                    generation: 1,
                    drivers
                },
                DashboardEvent::PredictionFinished {
                    generation: 1,
                    refresh_heatmap: true
                },
            ]
        );
    }

    #[tokio::test]
    async fn predict_failure_skips_explain() {
        let api = FakeApi::default();
        api.script_predict(Err(500));
        let (tx, mut rx) = crate::channel();

        let ticket = PredictionTicket {
            generation: 4,
            request: EnvironmentalInputs::default().to_request(bristol()),
        };
        run(&api, ticket, &tx).await;

        assert_eq!(api.calls(), vec![Call::Predict(ticket.request)]);
        assert_eq!(
            drain(&mut rx),
            vec![DashboardEvent::PredictionFinished {
                generation: 4,
                refresh_heatmap: false
            }]
        );
    }

    #[tokio::test]
    async fn explain_failure_keeps_probability() {
        let api = FakeApi::default();
        api.script_predict(Ok(0.55)).script_explain(Err(502));
        let (tx, mut rx) = crate::channel();

        let ticket = PredictionTicket {
            generation: 2,
            request: EnvironmentalInputs::default().to_request(bristol()),
        };
        run(&api, ticket, &tx).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                DashboardEvent::PredictionScored {
                    generation: 2,
                    probability: 0.55
                },
                DashboardEvent::PredictionFinished {
                    generation: 2,
                    refresh_heatmap: false
                },
            ]
        );
    }
}
