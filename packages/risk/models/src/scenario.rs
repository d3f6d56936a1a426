//! Predefined environmental scenarios.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A canned set of environmental conditions evaluated server-side.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Scenario {
    /// Typical seasonal conditions.
    Baseline,
    /// Hot, dry conditions.
    Heatwave,
    /// Strong sustained wind.
    HighWind,
    /// Cooler, damper conditions under an emissions-reduction pathway.
    Decarbonised,
}

impl Scenario {
    /// Returns all scenarios in panel order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Baseline,
            Self::Heatwave,
            Self::HighWind,
            Self::Decarbonised,
        ]
    }

    /// Button/row label: the wire name with underscores replaced by spaces,
    /// upper-cased (e.g. `HIGH WIND`).
    #[must_use]
    pub fn label(self) -> String {
        self.as_ref().replace('_', " ").to_uppercase()
    }
}

/// The latest result for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Which scenario was evaluated.
    pub scenario: Scenario,
    /// Model output in `[0, 1]`.
    pub risk_probability: f64,
}
