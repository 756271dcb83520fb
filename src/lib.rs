//! `ScenicQA` - Natural-language question answering over tourist attractions
//!
//! This library classifies Chinese questions about attractions (opening
//! hours, ticket prices, nearby spots, city listings, filtered searches),
//! looks the answer up in an attraction store and renders a reply.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod qa;
pub mod storage;

// Re-export core types for public API
pub use config::ScenicQaConfig;
pub use error::ScenicQaError;
pub use models::{Attraction, IntentKind, NumericFilter, ParsedQuestion, QueryResult};
pub use qa::{EntityDictionary, FALLBACK_ANSWER, QaService};
pub use storage::{AttractionStore, InMemoryStore, SqliteStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ScenicQaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
