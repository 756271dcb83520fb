//! Geographic coordinates and distance helpers

use serde::{Deserialize, Serialize};

/// Kilometres spanned by one degree of latitude
pub const KM_PER_DEGREE: f64 = 111.0;

/// Geographic coordinate of an attraction
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another coordinate in kilometres
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            haversine::Location {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            haversine::Units::Kilometers,
        )
    }

    /// Degree-aligned box that contains every point within `radius_km`.
    ///
    /// Returned as `(min_lat, max_lat, min_lon, max_lon)`. The longitude span
    /// is widened by `1 / cos(latitude)` so the box never undercuts the circle.
    #[must_use]
    pub fn bounding_box(&self, radius_km: f64) -> (f64, f64, f64, f64) {
        let lat_span = radius_km / KM_PER_DEGREE;
        let cos_lat = self.latitude.to_radians().cos().abs().max(0.01);
        let lon_span = (lat_span / cos_lat).min(180.0);
        (
            self.latitude - lat_span,
            self.latitude + lat_span,
            self.longitude - lon_span,
            self.longitude + lon_span,
        )
    }

    /// Format as "lat, lon" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
