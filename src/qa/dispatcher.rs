//! Routes a parsed question to the matching store query

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::config::SearchConfig;
use crate::models::{IntentKind, ParsedQuestion, QueryResult, ResultRow};
use crate::storage::{AttractionStore, NearbyQuery};

pub struct QueryDispatcher {
    store: Arc<dyn AttractionStore>,
    nearby_limit: usize,
    similar_limit: usize,
    city_limit: usize,
}

impl QueryDispatcher {
    pub fn new(store: Arc<dyn AttractionStore>, config: &SearchConfig) -> Self {
        Self {
            store,
            nearby_limit: config.nearby_limit,
            similar_limit: config.similar_limit,
            city_limit: config.city_limit,
        }
    }

    /// Run the query for `parsed`. Storage failures give an empty result.
    #[instrument(skip(self, parsed), fields(intent = %parsed.intent))]
    pub fn dispatch(&self, parsed: &ParsedQuestion) -> QueryResult {
        match self.try_dispatch(parsed) {
            Ok(result) => {
                debug!("Query returned {} rows", result.len());
                result
            }
            Err(e) if e.is_storage_unavailable() => {
                warn!("Attraction store unavailable, answering with fallback: {}", e);
                QueryResult::empty()
            }
            Err(e) => {
                warn!("Query for {} failed: {}", parsed.intent, e);
                QueryResult::empty()
            }
        }
    }

    fn try_dispatch(&self, parsed: &ParsedQuestion) -> Result<QueryResult> {
        match parsed.intent {
            IntentKind::Nearby => match &parsed.entity_name {
                Some(name) => self.nearby(name, parsed),
                None => Ok(QueryResult::empty()),
            },
            IntentKind::CitySpots | IntentKind::CompoundFilter => match &parsed.city_name {
                Some(city) => {
                    let rows = self
                        .store
                        .find_by_city(city, &parsed.numeric_filters, self.city_limit)?;
                    Ok(rows.into_iter().map(ResultRow::new).collect::<Vec<_>>().into())
                }
                None => Ok(QueryResult::empty()),
            },
            _ => match &parsed.entity_name {
                Some(name) => Ok(self.store.find_by_name(name)?.into()),
                None => Ok(QueryResult::empty()),
            },
        }
    }

    fn nearby(&self, name: &str, parsed: &ParsedQuestion) -> Result<QueryResult> {
        let Some(reference) = self.store.find_by_name(name)? else {
            return Ok(QueryResult::empty());
        };
        let Some(center) = reference.coordinates else {
            debug!("{} has no coordinates", name);
            return Ok(QueryResult::empty());
        };

        let query = NearbyQuery {
            center,
            radius_km: parsed.radius_km.unwrap_or_default(),
            exclude_name: reference.name.clone(),
            kind: if parsed.similar_only { reference.kind.clone() } else { None },
            limit: if parsed.similar_only { self.similar_limit } else { self.nearby_limit },
        };
        Ok(self.store.find_nearby(&query)?.into())
    }
}
