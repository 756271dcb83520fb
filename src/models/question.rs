//! Parsed question types shared by the pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// The classified purpose of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    Nearby,
    OpenTime,
    TicketPrice,
    CitySpots,
    Rating,
    Location,
    Contact,
    City,
    Province,
    Introduction,
    Traffic,
    CompoundFilter,
    SpotInfo,
    Unknown,
}

impl IntentKind {
    /// Intents answered from a single attraction looked up by name
    #[must_use]
    pub fn is_entity_scoped(self) -> bool {
        matches!(
            self,
            IntentKind::OpenTime
                | IntentKind::TicketPrice
                | IntentKind::Rating
                | IntentKind::Location
                | IntentKind::Contact
                | IntentKind::City
                | IntentKind::Province
                | IntentKind::Introduction
                | IntentKind::Traffic
                | IntentKind::SpotInfo
        )
    }

    /// Intents answered with a list scoped to a city
    #[must_use]
    pub fn is_city_scoped(self) -> bool {
        matches!(self, IntentKind::CitySpots | IntentKind::CompoundFilter)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::Nearby => "NEARBY",
            IntentKind::OpenTime => "OPEN_TIME",
            IntentKind::TicketPrice => "TICKET_PRICE",
            IntentKind::CitySpots => "CITY_SPOTS",
            IntentKind::Rating => "RATING",
            IntentKind::Location => "LOCATION",
            IntentKind::Contact => "CONTACT",
            IntentKind::City => "CITY",
            IntentKind::Province => "PROVINCE",
            IntentKind::Introduction => "INTRODUCTION",
            IntentKind::Traffic => "TRAFFIC",
            IntentKind::CompoundFilter => "COMPOUND_FILTER",
            IntentKind::SpotInfo => "SPOT_INFO",
            IntentKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute a numeric filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAttribute {
    Price,
    Rating,
}

impl FilterAttribute {
    /// Column holding the attribute in `scenic_spots`
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            FilterAttribute::Price => "s.cost",
            FilterAttribute::Rating => "s.rating",
        }
    }
}

/// Comparison operator of a numeric filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl Comparison {
    /// SQL operator token. Only ever one of four fixed strings.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }

    #[must_use]
    pub fn matches(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A `{attribute, operator, value}` constraint extracted from a question
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericFilter {
    pub attribute: FilterAttribute,
    pub operator: Comparison,
    pub value: f64,
}

impl NumericFilter {
    #[must_use]
    pub fn new(attribute: FilterAttribute, operator: Comparison, value: f64) -> Self {
        Self {
            attribute,
            operator,
            value,
        }
    }

    /// Whether an attribute value satisfies the filter. Absent values never do.
    #[must_use]
    pub fn accepts(&self, value: Option<f64>) -> bool {
        value.is_some_and(|v| self.operator.matches(v, self.value))
    }
}

/// Result of classification and extraction for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    pub intent: IntentKind,
    pub entity_name: Option<String>,
    pub city_name: Option<String>,
    pub numeric_filters: Vec<NumericFilter>,
    pub radius_km: Option<f64>,
    /// Restrict nearby results to the reference attraction's kind
    #[serde(default)]
    pub similar_only: bool,
    pub raw_text: String,
    /// Rewritten question, when the normalizer changed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_text: Option<String>,
}

impl ParsedQuestion {
    /// An `UNKNOWN` question with nothing extracted
    #[must_use]
    pub fn unknown(raw_text: impl Into<String>) -> Self {
        Self::new(IntentKind::Unknown, raw_text)
    }

    #[must_use]
    pub fn new(intent: IntentKind, raw_text: impl Into<String>) -> Self {
        Self {
            intent,
            entity_name: None,
            city_name: None,
            numeric_filters: Vec::new(),
            radius_km: None,
            similar_only: false,
            raw_text: raw_text.into(),
            normalized_text: None,
        }
    }

    #[must_use]
    pub fn with_entity(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city_name = Some(city.into());
        self
    }

    /// Whether the question carries enough to run a query
    #[must_use]
    pub fn is_answerable(&self) -> bool {
        if self.intent.is_city_scoped() {
            self.city_name.is_some()
        } else {
            self.entity_name.is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_scopes() {
        assert!(IntentKind::OpenTime.is_entity_scoped());
        assert!(IntentKind::Province.is_entity_scoped());
        assert!(!IntentKind::Nearby.is_entity_scoped());
        assert!(IntentKind::CompoundFilter.is_city_scoped());
        assert!(!IntentKind::Unknown.is_city_scoped());
    }

    #[test]
    fn test_filter_accepts() {
        let cheap = NumericFilter::new(FilterAttribute::Price, Comparison::Le, 50.0);
        assert!(cheap.accepts(Some(50.0)));
        assert!(cheap.accepts(Some(0.0)));
        assert!(!cheap.accepts(Some(60.0)));
        assert!(!cheap.accepts(None));
    }

    #[test]
    fn test_answerable() {
        assert!(!ParsedQuestion::unknown("?").is_answerable());
        assert!(ParsedQuestion::unknown("颐和园").with_entity("颐和园").is_answerable());
        assert!(!ParsedQuestion::new(IntentKind::CitySpots, "x").with_entity("y").is_answerable());
        assert!(ParsedQuestion::new(IntentKind::CitySpots, "x").with_city("北京市").is_answerable());
    }

    #[test]
    fn test_serialized_shape() {
        let mut parsed = ParsedQuestion::new(IntentKind::CompoundFilter, "北京门票低于50元的景点")
            .with_city("北京市");
        parsed
            .numeric_filters
            .push(NumericFilter::new(FilterAttribute::Price, Comparison::Le, 50.0));

        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["intent"], "COMPOUND_FILTER");
        assert_eq!(json["numeric_filters"][0]["attribute"], "price");
        assert_eq!(json["numeric_filters"][0]["operator"], "<=");
        assert!(json.get("normalized_text").is_none());
    }
}
