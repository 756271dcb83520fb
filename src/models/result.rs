//! Query results handed from the dispatcher to the renderer

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::attraction::Attraction;

/// One matched attraction, with the distance when the query was a proximity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub attraction: Attraction,
    pub distance_km: Option<f64>,
}

impl ResultRow {
    #[must_use]
    pub fn new(attraction: Attraction) -> Self {
        Self {
            attraction,
            distance_km: None,
        }
    }

    #[must_use]
    pub fn with_distance(attraction: Attraction, distance_km: f64) -> Self {
        Self {
            attraction,
            distance_km: Some(distance_km),
        }
    }
}

/// Ordered rows returned for a single question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<ResultRow>,
}

impl QueryResult {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn first(&self) -> Option<&ResultRow> {
        self.rows.first()
    }
}

impl From<Vec<ResultRow>> for QueryResult {
    fn from(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }
}

impl From<Option<Attraction>> for QueryResult {
    fn from(attraction: Option<Attraction>) -> Self {
        Self {
            rows: attraction.into_iter().map(ResultRow::new).collect(),
        }
    }
}

/// Higher ratings first, absent ratings last
pub fn compare_rating_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort proximity rows by distance, then rating descending, then name
pub fn rank_by_distance(rows: &mut [ResultRow]) {
    rows.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::INFINITY);
        let db = b.distance_km.unwrap_or(f64::INFINITY);
        da.partial_cmp(&db)
            .unwrap_or(Ordering::Equal)
            .then_with(|| compare_rating_desc(a.attraction.rating, b.attraction.rating))
            .then_with(|| a.attraction.name.cmp(&b.attraction.name))
    });
}

/// Sort city listings by rating descending, then name
pub fn rank_by_rating(attractions: &mut [Attraction]) {
    attractions.sort_by(|a, b| {
        compare_rating_desc(a.rating, b.rating).then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_by_distance_breaks_ties_on_rating() {
        let mut rows = vec![
            ResultRow::with_distance(Attraction::new("C").with_rating(4.0), 2.0),
            ResultRow::with_distance(Attraction::new("A").with_rating(3.5), 1.0),
            ResultRow::with_distance(Attraction::new("B").with_rating(4.9), 1.0),
        ];

        rank_by_distance(&mut rows);

        let names: Vec<_> = rows.iter().map(|r| r.attraction.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_rank_by_rating_puts_unrated_last() {
        let mut spots = vec![
            Attraction::new("unrated"),
            Attraction::new("good").with_rating(4.2),
            Attraction::new("best").with_rating(4.9),
        ];

        rank_by_rating(&mut spots);

        let names: Vec<_> = spots.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["best", "good", "unrated"]);
    }

    #[test]
    fn test_from_optional_attraction() {
        assert!(QueryResult::from(None).is_empty());
        assert_eq!(QueryResult::from(Some(Attraction::new("x"))).len(), 1);
    }
}
