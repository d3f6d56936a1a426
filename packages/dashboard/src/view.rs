//! Presentation models for the result and scenario panels.

use wildfire_risk_models::{Driver, RiskLevel, ScenarioResult, format_probability};

/// Shown while a prediction is in flight.
pub const LOADING_MESSAGE: &str = "Running model...";

/// Shown before any prediction has completed.
pub const IDLE_MESSAGE: &str = "Click on the map and run the model to see risk analysis.";

/// Rounds `value` to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// A feature contribution as displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRow {
    /// Feature name.
    pub feature: String,
    /// Contribution rounded to four decimals.
    pub contribution: f64,
}

/// A completed prediction as displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    /// Raw model output.
    pub probability: f64,
    /// Probability as a percentage with two decimals.
    pub percent: String,
    /// Risk tier.
    pub level: RiskLevel,
    /// Feature contributions in response order.
    pub drivers: Vec<DriverRow>,
}

impl RiskSummary {
    /// Builds the summary for a probability and its drivers.
    #[must_use]
    pub fn new(probability: f64, drivers: &[Driver]) -> Self {
        Self {
            probability,
            percent: format_probability(probability),
            level: RiskLevel::classify(probability),
            drivers: drivers
                .iter()
                .map(|d| DriverRow {
                    feature: d.feature.clone(),
                    contribution: round_to(d.contribution, 4),
                })
                .collect(),
        }
    }

    /// Decision advisory for the risk tier.
    #[must_use]
    pub const fn advisory(&self) -> &'static str {
        self.level.advisory()
    }
}

/// What the result panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// A prediction is in flight.
    Loading,
    /// No probability yet.
    Idle,
    /// A probability is available.
    Ready(RiskSummary),
}

impl ResultView {
    /// Derives the panel state. Loading takes precedence over any
    /// previous result.
    #[must_use]
    pub fn new(loading: bool, probability: Option<f64>, drivers: &[Driver]) -> Self {
        if loading {
            return Self::Loading;
        }
        probability.map_or(Self::Idle, |p| Self::Ready(RiskSummary::new(p, drivers)))
    }

    /// Placeholder text, when no summary is shown.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some(LOADING_MESSAGE),
            Self::Idle => Some(IDLE_MESSAGE),
            Self::Ready(_) => None,
        }
    }
}

/// One line of the scenario comparison list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRow {
    /// Display name (e.g. `"HIGH WIND"`).
    pub label: String,
    /// Probability as a percentage with two decimals.
    pub percent: String,
    /// Risk tier.
    pub level: RiskLevel,
}

/// Comparison rows, in result order.
#[must_use]
pub fn scenario_rows(results: &[ScenarioResult]) -> Vec<ScenarioRow> {
    results
        .iter()
        .map(|r| ScenarioRow {
            label: r.scenario.label(),
            percent: format_probability(r.risk_probability),
            level: RiskLevel::classify(r.risk_probability),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildfire_risk_models::Scenario;

    fn driver(feature: &str, contribution: f64) -> Driver {
        Driver {
            feature: feature.to_string(),
            contribution,
        }
    }

    #[test]
    fn loading_wins_over_previous_result() {
        let view = ResultView::new(true, Some(0.5), &[]);
        assert_eq!(view, ResultView::Loading);
        assert_eq!(view.message(), Some("Running model..."));
    }

    #[test]
    fn idle_without_probability() {
        let view = ResultView::new(false, None, &[driver("temperature", 0.1)]);
        assert_eq!(
            view.message(),
            Some("Click on the map and run the model to see risk analysis.")
        );
    }

    #[test]
    fn high_risk_summary() {
        let ResultView::Ready(summary) = ResultView::new(
            false,
            Some(0.75),
            &[driver("temperature", 0.123_456), driver("humidity", -0.042_17)],
        ) else {
            panic!("expected a summary");
        };
        assert_eq!(summary.percent, "75.00%");
        assert_eq!(summary.level, RiskLevel::High);
        assert_eq!(
            summary.advisory(),
            "High wildfire propagation probability detected. Immediate mitigation and monitoring recommended."
        );
        assert!((summary.drivers[0].contribution - 0.1235).abs() < 1e-12);
        assert!((summary.drivers[1].contribution - -0.0422).abs() < 1e-12);
    }

    #[test]
    fn scenario_rows_keep_result_order() {
        let rows = scenario_rows(&[
            ScenarioResult {
                scenario: Scenario::HighWind,
                risk_probability: 0.41,
            },
            ScenarioResult {
                scenario: Scenario::Baseline,
                risk_probability: 0.2,
            },
        ]);
        assert_eq!(rows[0].label, "HIGH WIND");
        assert_eq!(rows[0].level, RiskLevel::Medium);
        assert_eq!(rows[1].percent, "20.00%");
    }

    #[test]
    fn rounds_to_requested_places() {
        assert!((round_to(45.675_1, 2) - 45.68).abs() < 1e-12);
        assert!((round_to(-0.123_46, 4) - -0.1235).abs() < 1e-12);
    }
}
