//! Probability-over-time series for the trend chart.

use chrono::{Local, TimeZone};
use wildfire_risk_models::RiskPoint;

use crate::view::round_to;

/// Fixed y-axis range of the trend chart, in percent.
pub const TREND_Y_DOMAIN: [f64; 2] = [0.0, 100.0];

/// Time label format of the x-axis.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// One sample of the trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    /// Local time of the prediction (`HH:MM:SS`).
    pub time: String,
    /// Probability in percent, rounded to two decimals.
    pub risk_percent: f64,
}

/// Builds the trend series in received order, with times in the local
/// timezone. Returns `None` for an empty list (no chart).
#[must_use]
pub fn trend_series(points: &[RiskPoint]) -> Option<Vec<TrendPoint>> {
    trend_series_in(points, &Local)
}

/// Builds the trend series with times rendered in `tz`.
#[must_use]
pub fn trend_series_in<Tz>(points: &[RiskPoint], tz: &Tz) -> Option<Vec<TrendPoint>>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if points.is_empty() {
        return None;
    }

    Some(
        points
            .iter()
            .map(|p| TrendPoint {
                time: p
                    .created_at
                    .with_timezone(tz)
                    .format(TIME_FORMAT)
                    .to_string(),
                risk_percent: round_to(p.risk_probability * 100.0, 2),
            })
            .collect(),
    )
}
