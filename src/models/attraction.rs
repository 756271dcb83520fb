//! Attraction records as read from the store

use serde::{Deserialize, Serialize};

use super::location::Coordinates;

/// Opening hours of an attraction.
///
/// The free-text fields come straight from the import; `start_secs` and
/// `end_secs` are seconds since midnight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub today: Option<String>,
    pub weekly: Option<String>,
    pub start_secs: Option<u32>,
    pub end_secs: Option<u32>,
}

impl OpeningHours {
    /// Daily hours given as a start/end pair
    #[must_use]
    pub fn daily(start_secs: u32, end_secs: u32) -> Self {
        Self {
            start_secs: Some(start_secs),
            end_secs: Some(end_secs),
            ..Self::default()
        }
    }

    /// Today's hours text, ignoring blank imports
    #[must_use]
    pub fn today_text(&self) -> Option<&str> {
        self.today.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Weekly hours text, ignoring blank imports
    #[must_use]
    pub fn weekly_text(&self) -> Option<&str> {
        self.weekly.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// No usable text and no complete start/end pair
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.today_text().is_none()
            && self.weekly_text().is_none()
            && (self.start_secs.is_none() || self.end_secs.is_none())
    }
}

/// A tourist attraction joined with its city and province
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    /// Unique attraction name
    pub name: String,
    /// Category, e.g. "风景名胜" or "博物馆"
    pub kind: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Rating between 0.0 and 5.0
    pub rating: Option<f64>,
    /// Ticket cost in yuan; `Some(0.0)` means free, `None` unknown
    pub cost: Option<f64>,
    pub opening_hours: OpeningHours,
    /// Raw phone field, may hold several numbers
    pub tel: Option<String>,
}

impl Attraction {
    /// Create an attraction with only a name set
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            address: None,
            city: None,
            province: None,
            coordinates: None,
            rating: None,
            cost: None,
            opening_hours: OpeningHours::default(),
            tel: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set city and province
    #[must_use]
    pub fn in_city(mut self, city: impl Into<String>, province: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.province = Some(province.into());
        self
    }

    #[must_use]
    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates::new(latitude, longitude));
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    #[must_use]
    pub fn with_opening_hours(mut self, opening_hours: OpeningHours) -> Self {
        self.opening_hours = opening_hours;
        self
    }

    #[must_use]
    pub fn with_tel(mut self, tel: impl Into<String>) -> Self {
        self.tel = Some(tel.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let a = Attraction::new("颐和园")
            .with_kind("风景名胜")
            .in_city("北京市", "北京")
            .at(39.9999, 116.2755)
            .with_rating(4.8)
            .with_cost(30.0);

        assert_eq!(a.name, "颐和园");
        assert_eq!(a.city.as_deref(), Some("北京市"));
        assert_eq!(a.coordinates, Some(Coordinates::new(39.9999, 116.2755)));
        assert_eq!(a.rating, Some(4.8));
        assert_eq!(a.cost, Some(30.0));
        assert!(a.opening_hours.is_empty());
    }

    #[test]
    fn test_opening_hours_emptiness() {
        assert!(!OpeningHours::daily(8 * 3600, 17 * 3600).is_empty());
        let half = OpeningHours {
            start_secs: Some(8 * 3600),
            ..OpeningHours::default()
        };
        assert!(half.is_empty());

        let blank = OpeningHours {
            today: Some(String::new()),
            weekly: Some("  ".to_string()),
            ..OpeningHours::default()
        };
        assert!(blank.is_empty());
        assert_eq!(blank.today_text(), None);
        assert_eq!(blank.weekly_text(), None);
    }
}
