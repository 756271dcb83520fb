//! Storage collaborator
//!
//! The question pipeline only reads attractions through [`AttractionStore`].
//! Two implementations are provided:
//! - [`SqliteStore`]: the relational store (provinces, cities, scenic_spots)
//! - [`InMemoryStore`]: a vector-backed store for embedding and tests

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::Result;
use crate::models::{Attraction, Coordinates, NumericFilter, ResultRow};

/// Parameters of a proximity search
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub center: Coordinates,
    pub radius_km: f64,
    /// Attraction left out of the results (the reference point itself)
    pub exclude_name: String,
    /// Only keep attractions of this kind
    pub kind: Option<String>,
    pub limit: usize,
}

/// Read access to the attraction database
pub trait AttractionStore: Send + Sync {
    /// Every attraction name, used to build the entity dictionary
    fn attraction_names(&self) -> Result<Vec<String>>;

    /// Every city name, used to build the city dictionary
    fn city_names(&self) -> Result<Vec<String>>;

    /// Exact-name lookup
    fn find_by_name(&self, name: &str) -> Result<Option<Attraction>>;

    /// Attractions in `city` satisfying all `filters`, best rated first
    fn find_by_city(
        &self,
        city: &str,
        filters: &[NumericFilter],
        limit: usize,
    ) -> Result<Vec<Attraction>>;

    /// Attractions within `query.radius_km`, closest first
    fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<ResultRow>>;
}
