//! Heat layer derived from logged risk points.
//!
//! Each point's intensity is its probability relative to the highest
//! probability in the set, so the hottest point always renders at full
//! intensity regardless of the absolute risk level.

use serde::Deserialize;
use wildfire_risk_models::RiskPoint;

use crate::map::pixels_to_degrees;

/// A point weighted for the heat layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatPoint {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Relative intensity in `[0, 1]`.
    pub intensity: f64,
}

/// Normalizes risk points into heat layer weights.
///
/// Intensity is `probability / max_probability`, or `0` for every point
/// when the maximum is `0`. Returns `None` for an empty list, meaning no
/// layer should be drawn.
#[must_use]
pub fn normalize(points: &[RiskPoint]) -> Option<Vec<HeatPoint>> {
    if points.is_empty() {
        return None;
    }

    let max_risk = points
        .iter()
        .map(|p| p.risk_probability)
        .fold(f64::NEG_INFINITY, f64::max);

    Some(
        points
            .iter()
            .map(|p| {
                let intensity = if max_risk > 0.0 {
                    (p.risk_probability / max_risk).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                HeatPoint {
                    lat: p.latitude,
                    lng: p.longitude,
                    intensity,
                }
            })
            .collect(),
    )
}

/// An RGB colour, deserialized from a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#rrggbb` (the leading `#` is optional).
    #[must_use]
    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Linear interpolation towards `other` (`t` clamped to `[0, 1]`).
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            // Always within 0..=255 since t is clamped.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let v = v.round() as u8;
            v
        };
        Self(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }

    /// Scales every channel by `factor` (clamped to `[0, 1]`), i.e. blends
    /// towards black.
    #[must_use]
    pub fn dim(self, factor: f64) -> Self {
        Self(0, 0, 0).lerp(self, factor)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid colour '{value}', expected #rrggbb"))
    }
}

/// One colour stop of the heat gradient.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GradientStop {
    /// Position in `[0, 1]`.
    pub stop: f64,
    /// Colour at this position.
    pub color: Rgb,
}

/// Rendering options for the heat layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeatLayerStyle {
    /// Point radius in screen pixels at the current zoom.
    pub radius: u32,
    /// Blur radius in screen pixels.
    pub blur: u32,
    /// Zoom level at which points reach full intensity.
    pub max_zoom: u8,
    /// Minimum opacity of any drawn point.
    pub min_opacity: f64,
    /// Colour stops, ascending by position.
    pub gradient: Vec<GradientStop>,
}

impl Default for HeatLayerStyle {
    fn default() -> Self {
        Self {
            radius: 55,
            blur: 35,
            max_zoom: 17,
            min_opacity: 0.4,
            gradient: vec![
                GradientStop {
                    stop: 0.2,
                    color: Rgb(0x2f, 0x54, 0xeb),
                },
                GradientStop {
                    stop: 0.4,
                    color: Rgb(0x13, 0xc2, 0xc2),
                },
                GradientStop {
                    stop: 0.6,
                    color: Rgb(0xfa, 0xdb, 0x14),
                },
                GradientStop {
                    stop: 0.8,
                    color: Rgb(0xfa, 0x8c, 0x16),
                },
                GradientStop {
                    stop: 1.0,
                    color: Rgb(0xcf, 0x13, 0x22),
                },
            ],
        }
    }
}

impl HeatLayerStyle {
    /// Gradient colour at `intensity`.
    ///
    /// Below the first stop the first colour is used, above the last stop
    /// the last colour; in between, colours are interpolated linearly.
    #[must_use]
    pub fn gradient_color(&self, intensity: f64) -> Rgb {
        let Some(first) = self.gradient.first() else {
            return Rgb(0xff, 0xff, 0xff);
        };
        if intensity <= first.stop {
            return first.color;
        }

        for pair in self.gradient.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if intensity <= hi.stop {
                let span = hi.stop - lo.stop;
                let t = if span > 0.0 {
                    (intensity - lo.stop) / span
                } else {
                    1.0
                };
                return lo.color.lerp(hi.color, t);
            }
        }

        self.gradient.last().map_or(first.color, |s| s.color)
    }

    /// Colour for a point drawn on a dark background: the gradient colour
    /// dimmed by the point's opacity, which never falls below
    /// [`Self::min_opacity`].
    #[must_use]
    pub fn shade(&self, intensity: f64) -> Rgb {
        let opacity = intensity.max(self.min_opacity).min(1.0);
        self.gradient_color(intensity).dim(opacity)
    }

    /// Core and halo radius of a point in degrees of longitude at `zoom`.
    ///
    /// The halo extends the core by the blur distance. Past
    /// [`Self::max_zoom`] the radii stop shrinking.
    #[must_use]
    pub fn radii(&self, zoom: u8) -> (f64, f64) {
        let zoom = zoom.min(self.max_zoom);
        (
            pixels_to_degrees(f64::from(self.radius), zoom),
            pixels_to_degrees(f64::from(self.radius + self.blur), zoom),
        )
    }

    /// Checks that stops are non-empty, within `[0, 1]`, and ascending, and
    /// that `min_opacity` lies in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.gradient.is_empty() {
            return Err("heat gradient must have at least one stop".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_opacity) {
            return Err(format!(
                "heat min_opacity {} must be within [0, 1]",
                self.min_opacity
            ));
        }
        if let Some(stop) = self.gradient.iter().find(|s| !(0.0..=1.0).contains(&s.stop)) {
            return Err(format!("heat gradient stop {} must be within [0, 1]", stop.stop));
        }
        if self.gradient.windows(2).any(|w| w[0].stop >= w[1].stop) {
            return Err("heat gradient stops must be strictly ascending".to_string());
        }
        Ok(())
    }
}
