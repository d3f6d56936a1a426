//! Environmental input sliders.
//!
//! Each input is an integer slider with a fixed range. Adjustments clamp
//! to the range instead of wrapping.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::Location;
use crate::api::RiskRequest;

/// One of the three environmental sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    /// Air temperature in °C.
    Temperature,
    /// Relative humidity in %.
    Humidity,
    /// Wind speed in km/h.
    WindSpeed,
}

impl InputField {
    /// Returns all fields in panel order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Temperature, Self::Humidity, Self::WindSpeed]
    }

    /// Slider label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::WindSpeed => "Wind Speed",
        }
    }

    /// Display unit appended to the value.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::WindSpeed => " km/h",
        }
    }

    /// Allowed slider range.
    #[must_use]
    pub const fn range(self) -> RangeInclusive<u8> {
        match self {
            Self::Temperature | Self::WindSpeed => 0..=50,
            Self::Humidity => 0..=100,
        }
    }

    /// The next field in panel order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Temperature => Self::Humidity,
            Self::Humidity => Self::WindSpeed,
            Self::WindSpeed => Self::Temperature,
        }
    }

    /// The previous field in panel order, wrapping around.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Temperature => Self::WindSpeed,
            Self::Humidity => Self::Temperature,
            Self::WindSpeed => Self::Humidity,
        }
    }
}

/// Current slider values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalInputs {
    /// Temperature in °C.
    pub temperature: u8,
    /// Relative humidity in %.
    pub humidity: u8,
    /// Wind speed in km/h.
    pub wind_speed: u8,
}

impl Default for EnvironmentalInputs {
    fn default() -> Self {
        Self {
            temperature: 30,
            humidity: 40,
            wind_speed: 15,
        }
    }
}

impl EnvironmentalInputs {
    /// Creates inputs, clamping every value into its slider range.
    #[must_use]
    pub fn new(temperature: u8, humidity: u8, wind_speed: u8) -> Self {
        let mut inputs = Self {
            temperature,
            humidity,
            wind_speed,
        };
        for field in InputField::all() {
            inputs.set(*field, inputs.get(*field));
        }
        inputs
    }

    /// Current value of a slider.
    #[must_use]
    pub const fn get(&self, field: InputField) -> u8 {
        match field {
            InputField::Temperature => self.temperature,
            InputField::Humidity => self.humidity,
            InputField::WindSpeed => self.wind_speed,
        }
    }

    /// Sets a slider, clamping into its range.
    pub fn set(&mut self, field: InputField, value: u8) {
        let range = field.range();
        let value = value.clamp(*range.start(), *range.end());
        match field {
            InputField::Temperature => self.temperature = value,
            InputField::Humidity => self.humidity = value,
            InputField::WindSpeed => self.wind_speed = value,
        }
    }

    /// Moves a slider by `delta`, clamping into its range.
    pub fn adjust(&mut self, field: InputField, delta: i16) {
        let range = field.range();
        let next = (i16::from(self.get(field)) + delta)
            .clamp(i16::from(*range.start()), i16::from(*range.end()));
        // Clamped to a u8 range above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        self.set(field, next as u8);
    }

    /// Slider value with its unit (e.g. `"30°C"`).
    #[must_use]
    pub fn display(&self, field: InputField) -> String {
        format!("{}{}", self.get(field), field.unit())
    }

    /// Builds the predict/explain payload for a location.
    #[must_use]
    pub fn to_request(&self, location: Location) -> RiskRequest {
        RiskRequest {
            temperature: f64::from(self.temperature),
            humidity: f64::from(self.humidity),
            wind_speed: f64::from(self.wind_speed),
            latitude: location.lat,
            longitude: location.lng,
        }
    }
}
