#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core data types for the wildfire risk dashboard.
//!
//! These are the plain, session-scoped values the dashboard exchanges with
//! the remote prediction service: risk points for the heat layer, feature
//! drivers from the explanation endpoint, the selected map location, and
//! scenario results. The three-tier [`RiskLevel`] classification lives here
//! so that every panel colours and labels probabilities the same way.

pub mod api;
pub mod inputs;
pub mod scenario;
pub mod simulation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use inputs::{EnvironmentalInputs, InputField};
pub use scenario::{Scenario, ScenarioResult};
pub use simulation::{InvalidGridError, SimulationGrid};

/// Probability above which a prediction is classified as [`RiskLevel::High`].
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Probability above which a prediction is classified as
/// [`RiskLevel::Medium`].
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

/// Three-tier wildfire risk classification.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Probability at or below 0.4.
    Low,
    /// Probability above 0.4 and at or below 0.7.
    Medium,
    /// Probability above 0.7.
    High,
}

impl RiskLevel {
    /// Classifies a risk probability.
    ///
    /// Both thresholds are exclusive lower bounds: `0.7` is
    /// [`Self::Medium`] and `0.4` is [`Self::Low`]. Values that compare
    /// false against both thresholds (including `NaN`) are [`Self::Low`].
    #[must_use]
    pub fn classify(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            Self::High
        } else if probability > MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Badge label shown next to a probability.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Badge colour as a `#rrggbb` hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "#389e0d",
            Self::Medium => "#fa8c16",
            Self::High => "#cf1322",
        }
    }

    /// Badge colour as an RGB triple.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Low => (0x38, 0x9e, 0x0d),
            Self::Medium => (0xfa, 0x8c, 0x16),
            Self::High => (0xcf, 0x13, 0x22),
        }
    }

    /// Decision advisory shown under the risk badge.
    #[must_use]
    pub const fn advisory(self) -> &'static str {
        match self {
            Self::Low => {
                "Low wildfire propagation probability under current environmental conditions."
            }
            Self::Medium => "Moderate wildfire risk detected. Preventive control strategies advised.",
            Self::High => {
                "High wildfire propagation probability detected. Immediate mitigation and monitoring recommended."
            }
        }
    }

    /// Returns all variants of this enum, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// Formats a probability in `[0, 1]` as a percentage with two decimals
/// (e.g. `0.4567` -> `"45.67%"`).
#[must_use]
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// A stored prediction as returned by the heatmap endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPoint {
    /// Prediction log ID, when the service includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Model output in `[0, 1]`.
    pub risk_probability: f64,
    /// When the prediction was logged.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Temperature input (°C), when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Humidity input (%), when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Wind speed input (km/h), when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

impl RiskPoint {
    /// Creates a point with only the fields the dashboard renders.
    #[must_use]
    pub const fn new(
        latitude: f64,
        longitude: f64,
        risk_probability: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            latitude,
            longitude,
            risk_probability,
            created_at,
            temperature: None,
            humidity: None,
            wind_speed: None,
        }
    }

    /// Risk tier of this point.
    #[must_use]
    pub fn level(&self) -> RiskLevel {
        RiskLevel::classify(self.risk_probability)
    }
}

/// A named input feature and its signed contribution to one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Feature name (e.g. `"temperature"`).
    pub feature: String,
    /// Signed contribution to the predicted probability.
    pub contribution: f64,
}

/// A point selected on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat: {:.4}, Lng: {:.4}", self.lat, self.lng)
    }
}

/// Timestamp (de)serialization that tolerates the naive ISO 8601 strings
/// the service emits (no offset, assumed UTC) as well as RFC 3339.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize as _, Deserializer, Serializer};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }
}
