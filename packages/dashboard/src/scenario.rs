//! Canned scenario evaluations.
//!
//! Scenarios run independently of each other and of the prediction
//! workflow; only re-running a scenario that is still in flight is refused.

use std::collections::BTreeSet;

use thiserror::Error;
use wildfire_risk_client::RiskApi;
use wildfire_risk_models::{Scenario, ScenarioResult};

use crate::{DashboardEvent, EventSender, emit};

/// Why a scenario could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScenarioRejected {
    /// The scenario is already being evaluated.
    #[error("Scenario {0} is already running.")]
    AlreadyRunning(Scenario),
}

/// Scenario comparison list plus per-scenario running flags.
#[derive(Debug, Clone, Default)]
pub struct ScenarioBoard {
    results: Vec<ScenarioResult>,
    running: BTreeSet<Scenario>,
}

impl ScenarioBoard {
    /// Marks `scenario` as running.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioRejected::AlreadyRunning`] if it already is.
    pub fn begin(&mut self, scenario: Scenario) -> Result<(), ScenarioRejected> {
        if self.running.insert(scenario) {
            Ok(())
        } else {
            Err(ScenarioRejected::AlreadyRunning(scenario))
        }
    }

    /// Stores a result, replacing an earlier one for the same scenario in
    /// place or appending it.
    pub fn record(&mut self, result: ScenarioResult) {
        match self
            .results
            .iter_mut()
            .find(|r| r.scenario == result.scenario)
        {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }

    /// Clears the running flag of `scenario`.
    pub fn finish(&mut self, scenario: Scenario) {
        self.running.remove(&scenario);
    }

    /// Whether `scenario` is in flight.
    #[must_use]
    pub fn is_running(&self, scenario: Scenario) -> bool {
        self.running.contains(&scenario)
    }

    /// Results in first-completion order.
    #[must_use]
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }
}

/// Evaluates one scenario and always reports its end. A failure keeps any
/// earlier result for the scenario.
pub async fn run(api: &dyn RiskApi, scenario: Scenario, events: &EventSender) {
    match api.predict_scenario(scenario).await {
        Ok(result) => emit(events, DashboardEvent::ScenarioScored(result)),
        Err(e) => log::error!("Scenario error ({scenario}): {e}"),
    }
    emit(events, DashboardEvent::ScenarioFinished { scenario });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeApi, drain};

    fn result(scenario: Scenario, risk_probability: f64) -> ScenarioResult {
        ScenarioResult {
            scenario,
            risk_probability,
        }
    }

    #[test]
    fn refuses_rerun_while_running_only() {
        let mut board = ScenarioBoard::default();
        board.begin(Scenario::Heatwave).unwrap();
        board.begin(Scenario::Baseline).unwrap();
        assert_eq!(
            board.begin(Scenario::Heatwave).unwrap_err(),
            ScenarioRejected::AlreadyRunning(Scenario::Heatwave)
        );

        board.finish(Scenario::Heatwave);
        assert!(!board.is_running(Scenario::Heatwave));
        assert!(board.is_running(Scenario::Baseline));
        board.begin(Scenario::Heatwave).unwrap();
    }

    #[test]
    fn replaces_in_place() {
        let mut board = ScenarioBoard::default();
        board.record(result(Scenario::Heatwave, 0.8));
        board.record(result(Scenario::Baseline, 0.3));
        board.record(result(Scenario::Heatwave, 0.6));

        assert_eq!(
            board.results(),
            &[
                result(Scenario::Heatwave, 0.6),
                result(Scenario::Baseline, 0.3)
            ]
        );
    }

    #[tokio::test]
    async fn success_then_finish() {
        let api = FakeApi::default();
        api.script_scenario(Ok(result(Scenario::HighWind, 0.71)));
        let (tx, mut rx) = crate::channel();

        run(&api, Scenario::HighWind, &tx).await;

        assert_eq!(api.calls(), vec![Call::Scenario(Scenario::HighWind)]);
        assert_eq!(
            drain(&mut rx),
            vec![
                DashboardEvent::ScenarioScored(result(Scenario::HighWind, 0.71)),
                DashboardEvent::ScenarioFinished {
                    scenario: Scenario::HighWind
                },
            ]
        );
    }

    #[tokio::test]
    async fn failure_only_finishes() {
        let api = FakeApi::default();
        api.script_scenario(Err(500));
        let (tx, mut rx) = crate::channel();

        run(&api, Scenario::Decarbonised, &tx).await;

        assert_eq!(
            drain(&mut rx),
            vec![DashboardEvent::ScenarioFinished {
                scenario: Scenario::Decarbonised
            }]
        );
    }
}
