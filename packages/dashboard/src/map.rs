//! Map viewport: converts between geographic coordinates and cells of the
//! map pane.
//!
//! The visible longitude span at zoom `z` is that of [`VIEW_WIDTH_TILES`]
//! web-map tiles (`360 * VIEW_WIDTH_TILES / 2^z` degrees). The latitude span
//! follows from the pane's aspect ratio, assuming terminal cells are twice
//! as tall as they are wide, and is corrected by `cos(lat)` so distances
//! look the same in both directions near the center.

use geo::{Rect, coord};
use wildfire_risk_models::Location;

/// Lowest supported zoom level.
pub const MIN_ZOOM: u8 = 2;

/// Highest supported zoom level.
pub const MAX_ZOOM: u8 = 17;

/// Width of the map pane, in web-map tiles.
pub const VIEW_WIDTH_TILES: f64 = 4.0;

/// Width of a web-map tile in pixels.
const TILE_SIZE_PX: f64 = 256.0;

/// Latitude limit of the web-mercator projection.
const MAX_LATITUDE: f64 = 85.0511;

/// Center and zoom of the map pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    center: Location,
    zoom: u8,
}

impl MapViewport {
    /// Creates a viewport, clamping zoom to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    #[must_use]
    pub fn new(center: Location, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Current center.
    #[must_use]
    pub const fn center(&self) -> Location {
        self.center
    }

    /// Current zoom level.
    #[must_use]
    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Degrees of longitude covered by the pane.
    #[must_use]
    pub fn lng_span(&self) -> f64 {
        360.0 * VIEW_WIDTH_TILES / 2f64.powi(i32::from(self.zoom))
    }

    /// Degrees of latitude covered by a pane of `cols` x `rows` cells.
    #[must_use]
    pub fn lat_span(&self, cols: u16, rows: u16) -> f64 {
        let cols = f64::from(cols.max(1));
        let rows = f64::from(rows.max(1));
        self.lng_span() * self.center.lat.to_radians().cos() * 2.0 * rows / cols
    }

    /// Geographic bounds of a pane of `cols` x `rows` cells.
    #[must_use]
    pub fn bounds(&self, cols: u16, rows: u16) -> Rect<f64> {
        let half_lng = self.lng_span() / 2.0;
        let half_lat = self.lat_span(cols, rows) / 2.0;
        Rect::new(
            coord! { x: self.center.lng - half_lng, y: self.center.lat - half_lat },
            coord! { x: self.center.lng + half_lng, y: self.center.lat + half_lat },
        )
    }

    /// Location under the center of cell (`col`, `row`), counted from the
    /// top-left of the pane.
    #[must_use]
    pub fn location_at(&self, col: u16, row: u16, cols: u16, rows: u16) -> Location {
        let bounds = self.bounds(cols, rows);
        let x = (f64::from(col) + 0.5) / f64::from(cols.max(1));
        let y = (f64::from(row) + 0.5) / f64::from(rows.max(1));
        Location::new(
            bounds.max().y - y * bounds.height(),
            bounds.min().x + x * bounds.width(),
        )
    }

    /// Whether `location` falls inside the pane.
    #[must_use]
    pub fn contains(&self, location: Location, cols: u16, rows: u16) -> bool {
        let bounds = self.bounds(cols, rows);
        (bounds.min().x..=bounds.max().x).contains(&location.lng)
            && (bounds.min().y..=bounds.max().y).contains(&location.lat)
    }

    /// Moves the center by a fraction of the visible span. Positive `dx`
    /// pans east, positive `dy` pans north.
    pub fn pan(&mut self, dx: f64, dy: f64, cols: u16, rows: u16) {
        let lat = dy.mul_add(self.lat_span(cols, rows), self.center.lat);
        let lng = dx.mul_add(self.lng_span(), self.center.lng);
        self.center = Location::new(lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), wrap_longitude(lng));
    }

    /// Moves the center to `location`.
    pub const fn recenter(&mut self, location: Location) {
        self.center = location;
    }

    /// Zooms in one level, up to [`MAX_ZOOM`].
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    /// Zooms out one level, down to [`MIN_ZOOM`].
    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    /// Converts a screen distance in web-map pixels at the current zoom to
    /// degrees of longitude.
    #[must_use]
    pub fn pixels_to_degrees(&self, pixels: f64) -> f64 {
        pixels_to_degrees(pixels, self.zoom)
    }
}

/// Converts a screen distance in web-map pixels at `zoom` to degrees of
/// longitude.
#[must_use]
pub fn pixels_to_degrees(pixels: f64, zoom: u8) -> f64 {
    pixels / TILE_SIZE_PX * 360.0 / 2f64.powi(i32::from(zoom))
}

fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}
