//! Data models for the ScenicQA library
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and distance helpers
//! - Attraction: Attraction records as stored
//! - Question: Intents, filters and the parsed question
//! - Result: Typed query result rows

pub mod attraction;
pub mod location;
pub mod question;
pub mod result;

// Re-export all public types for convenient access
pub use attraction::{Attraction, OpeningHours};
pub use location::Coordinates;
pub use question::{Comparison, FilterAttribute, IntentKind, NumericFilter, ParsedQuestion};
pub use result::{QueryResult, ResultRow};
