use std::collections::BTreeSet;

use super::{AttractionStore, NearbyQuery};
use crate::Result;
use crate::models::result::{rank_by_distance, rank_by_rating};
use crate::models::{Attraction, FilterAttribute, NumericFilter, ResultRow};

/// Attraction store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    attractions: Vec<Attraction>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(attractions: Vec<Attraction>) -> Self {
        let mut store = Self::default();
        for attraction in attractions {
            store.insert(attraction);
        }
        store
    }

    /// Add an attraction, replacing one with the same name
    pub fn insert(&mut self, attraction: Attraction) {
        match self.attractions.iter_mut().find(|a| a.name == attraction.name) {
            Some(existing) => *existing = attraction,
            None => self.attractions.push(attraction),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attractions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attractions.is_empty()
    }
}

impl AttractionStore for InMemoryStore {
    fn attraction_names(&self) -> Result<Vec<String>> {
        Ok(self.attractions.iter().map(|a| a.name.clone()).collect())
    }

    fn city_names(&self) -> Result<Vec<String>> {
        let cities: BTreeSet<&String> = self
            .attractions
            .iter()
            .filter_map(|a| a.city.as_ref())
            .collect();
        Ok(cities.into_iter().cloned().collect())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Attraction>> {
        Ok(self.attractions.iter().find(|a| a.name == name).cloned())
    }

    fn find_by_city(
        &self,
        city: &str,
        filters: &[NumericFilter],
        limit: usize,
    ) -> Result<Vec<Attraction>> {
        let mut matches: Vec<Attraction> = self
            .attractions
            .iter()
            .filter(|a| a.city.as_deref() == Some(city))
            .filter(|a| {
                filters.iter().all(|f| match f.attribute {
                    FilterAttribute::Price => f.accepts(a.cost),
                    FilterAttribute::Rating => f.accepts(a.rating),
                })
            })
            .cloned()
            .collect();

        rank_by_rating(&mut matches);
        matches.truncate(limit);
        Ok(matches)
    }

    fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<ResultRow>> {
        let mut rows: Vec<ResultRow> = self
            .attractions
            .iter()
            .filter(|a| a.name != query.exclude_name)
            .filter(|a| query.kind.is_none() || a.kind == query.kind)
            .filter_map(|a| {
                let distance = query.center.distance_km(&a.coordinates?);
                (distance <= query.radius_km).then(|| ResultRow::with_distance(a.clone(), distance))
            })
            .collect();

        rank_by_distance(&mut rows);
        rows.truncate(query.limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comparison, Coordinates};

    fn store() -> InMemoryStore {
        InMemoryStore::new(vec![
            Attraction::new("颐和园")
                .with_kind("风景名胜")
                .in_city("北京市", "北京")
                .at(39.9999, 116.2755)
                .with_rating(4.8)
                .with_cost(30.0),
            Attraction::new("圆明园")
                .with_kind("风景名胜")
                .in_city("北京市", "北京")
                .at(40.0080, 116.2984)
                .with_rating(4.6)
                .with_cost(25.0),
            Attraction::new("北京大学")
                .with_kind("学校")
                .in_city("北京市", "北京")
                .at(39.9869, 116.3059),
        ])
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut store = store();
        store.insert(Attraction::new("颐和园").with_rating(1.0));
        assert_eq!(store.len(), 3);
        assert_eq!(store.find_by_name("颐和园").unwrap().unwrap().rating, Some(1.0));
    }

    #[test]
    fn test_city_names_are_unique() {
        assert_eq!(store().city_names().unwrap(), vec!["北京市".to_string()]);
    }

    #[test]
    fn test_rating_filter_skips_unrated() {
        let filter = NumericFilter::new(FilterAttribute::Rating, Comparison::Ge, 4.7);
        let rows = store().find_by_city("北京市", &[filter], 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "颐和园");
    }

    #[test]
    fn test_nearby_with_kind() {
        let query = NearbyQuery {
            center: Coordinates::new(39.9999, 116.2755),
            radius_km: 10.0,
            exclude_name: "颐和园".to_string(),
            kind: Some("风景名胜".to_string()),
            limit: 5,
        };
        let rows = store().find_nearby(&query).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attraction.name, "圆明园");
    }
}
