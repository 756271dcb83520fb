//! Entity dictionary
//!
//! In-memory index of every known attraction and city name, built once from
//! the store. Lookups are longest-name-first so that a short name never
//! shadows a longer one containing it ("故宫" vs "故宫博物院").

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use super::segment::segment;
use crate::storage::AttractionStore;

/// Attractions used when the store cannot be read
pub const SEED_ATTRACTIONS: &[&str] = &[
    "法海寺",
    "红螺寺",
    "明十三陵",
    "颐和园",
    "故宫博物院",
    "天坛公园",
];

/// Cities used when the store cannot be read
pub const SEED_CITIES: &[&str] = &["北京市", "上海市", "广州市"];

/// Suffixes dropped to derive a city's short name ("北京市" -> "北京")
const CITY_SUFFIXES: &[&str] = &["市", "地区"];

/// Possessive marker that frames a name inside a question
const POSSESSIVE: char = '的';

/// Names (and optional aliases) ordered longest first
#[derive(Debug, Clone, Default)]
struct NameIndex {
    /// (lower-cased key, canonical name)
    names: Vec<(String, String)>,
    aliases: Vec<(String, String)>,
    /// Every key, names and aliases, to canonical name
    words: HashMap<String, String>,
    max_len: usize,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn sort_longest_first(entries: &mut [(String, String)]) {
    entries.sort_by(|a, b| {
        char_len(&b.0)
            .cmp(&char_len(&a.0))
            .then_with(|| a.0.cmp(&b.0))
    });
}

fn is_boundary(c: Option<char>) -> bool {
    c.is_none_or(|c| c.is_whitespace() || !c.is_alphanumeric())
}

/// A match is framed when the possessive marker touches it, or when both
/// neighbours are whitespace, punctuation or the edge of the text.
fn is_framed(prev: Option<char>, next: Option<char>) -> bool {
    prev == Some(POSSESSIVE) || next == Some(POSSESSIVE) || (is_boundary(prev) && is_boundary(next))
}

impl NameIndex {
    fn build<I>(names: I, aliases: Vec<(String, String)>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut words = HashMap::new();
        let mut entries = Vec::new();

        for name in names {
            let name = name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            let key = name.to_lowercase();
            if words.insert(key.clone(), name.clone()).is_none() {
                entries.push((key, name));
            }
        }

        let mut alias_entries = Vec::new();
        for (alias, canonical) in aliases {
            let key = alias.to_lowercase();
            if !words.contains_key(&key) {
                words.insert(key.clone(), canonical.clone());
                alias_entries.push((key, canonical));
            }
        }

        sort_longest_first(&mut entries);
        sort_longest_first(&mut alias_entries);
        let max_len = words.keys().map(|k| char_len(k)).max().unwrap_or(0);

        Self {
            names: entries,
            aliases: alias_entries,
            words,
            max_len,
        }
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn framed_match(&self, text: &str) -> Option<&str> {
        self.names.iter().find_map(|(key, name)| {
            text.match_indices(key.as_str())
                .any(|(start, _)| {
                    let prev = text[..start].chars().next_back();
                    let next = text[start + key.len()..].chars().next();
                    is_framed(prev, next)
                })
                .then_some(name.as_str())
        })
    }

    fn alias_match(&self, text: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(key, _)| text.contains(key.as_str()))
            .map(|(_, canonical)| canonical.as_str())
    }

    fn segmented_match(&self, text: &str) -> Option<&str> {
        if self.words.is_empty() {
            return None;
        }
        segment(text, self.max_len, |w| self.words.contains_key(w))
            .into_iter()
            .filter(|token| self.words.contains_key(token))
            .max_by_key(|token| char_len(token))
            .and_then(|token| self.words.get(&token).map(String::as_str))
    }
}

/// Immutable index of attraction and city names
#[derive(Debug, Clone, Default)]
pub struct EntityDictionary {
    attractions: NameIndex,
    cities: NameIndex,
    degraded: bool,
}

impl EntityDictionary {
    /// Build from explicit name lists
    pub fn from_names<A, C>(attractions: A, cities: C) -> Self
    where
        A: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        let cities: Vec<String> = cities.into_iter().collect();
        let short_names = short_city_names(&cities);
        Self {
            attractions: NameIndex::build(attractions, Vec::new()),
            cities: NameIndex::build(cities, short_names),
            degraded: false,
        }
    }

    /// Built-in seed dictionary
    #[must_use]
    pub fn seed() -> Self {
        let mut dictionary = Self::from_names(
            SEED_ATTRACTIONS.iter().map(|s| (*s).to_string()),
            SEED_CITIES.iter().map(|s| (*s).to_string()),
        );
        dictionary.degraded = true;
        dictionary
    }

    /// Load every name from the store.
    ///
    /// Never fails: a part that cannot be read is replaced by the seed list
    /// and the dictionary is flagged as degraded.
    pub fn load(store: &dyn AttractionStore) -> Self {
        let mut degraded = false;

        let attractions = store.attraction_names().unwrap_or_else(|e| {
            warn!("Failed to load attraction names, using seed dictionary: {}", e);
            degraded = true;
            SEED_ATTRACTIONS.iter().map(|s| (*s).to_string()).collect()
        });
        let cities = store.city_names().unwrap_or_else(|e| {
            warn!("Failed to load city names, using seed dictionary: {}", e);
            degraded = true;
            SEED_CITIES.iter().map(|s| (*s).to_string()).collect()
        });

        let mut dictionary = Self::from_names(attractions, cities);
        dictionary.degraded = degraded;
        info!(
            "Entity dictionary loaded: {} attractions, {} cities{}",
            dictionary.attraction_count(),
            dictionary.city_count(),
            if degraded { " (degraded)" } else { "" }
        );
        dictionary
    }

    /// Attraction named in `text`, if any
    #[must_use]
    pub fn lookup_entity(&self, text: &str) -> Option<String> {
        let text = text.to_lowercase();
        self.attractions
            .framed_match(&text)
            .or_else(|| self.attractions.segmented_match(&text))
            .map(str::to_string)
    }

    /// City named in `text`, resolved to its canonical name
    #[must_use]
    pub fn lookup_city(&self, text: &str) -> Option<String> {
        let text = text.to_lowercase();
        self.cities
            .framed_match(&text)
            .or_else(|| self.cities.alias_match(&text))
            .or_else(|| self.cities.segmented_match(&text))
            .map(str::to_string)
    }

    #[must_use]
    pub fn contains_attraction(&self, name: &str) -> bool {
        self.attractions.names.iter().any(|(_, n)| n == name)
    }

    #[must_use]
    pub fn attraction_count(&self) -> usize {
        self.attractions.len()
    }

    #[must_use]
    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    /// Whether the seed lists stand in for unreadable store data
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Short name -> canonical name for cities with a known suffix
fn short_city_names(cities: &[String]) -> Vec<(String, String)> {
    cities
        .iter()
        .filter_map(|city| {
            let city = city.trim();
            CITY_SUFFIXES.iter().find_map(|suffix| {
                city.strip_suffix(suffix)
                    .filter(|short| char_len(short) >= 2)
                    .map(|short| (short.to_string(), city.to_string()))
            })
        })
        .collect()
}

/// Dictionary shared between concurrent requests.
///
/// Readers take an `Arc` snapshot; [`SharedDictionary::reload`] builds a
/// complete replacement before swapping it in, so a reader never sees a
/// half-built index.
#[derive(Debug)]
pub struct SharedDictionary {
    current: RwLock<Arc<EntityDictionary>>,
}

impl SharedDictionary {
    #[must_use]
    pub fn new(dictionary: EntityDictionary) -> Self {
        Self {
            current: RwLock::new(Arc::new(dictionary)),
        }
    }

    /// Load from the store
    pub fn load(store: &dyn AttractionStore) -> Self {
        Self::new(EntityDictionary::load(store))
    }

    /// Current snapshot
    #[must_use]
    pub fn get(&self) -> Arc<EntityDictionary> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Rebuild from the store and swap the result in.
    ///
    /// A degraded rebuild does not replace a healthy dictionary.
    pub fn reload(&self, store: &dyn AttractionStore) -> Arc<EntityDictionary> {
        let fresh = Arc::new(EntityDictionary::load(store));
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        if fresh.is_degraded() && !current.is_degraded() {
            warn!("Dictionary reload could not read the store, keeping the current dictionary");
            return Arc::clone(&current);
        }

        *current = Arc::clone(&fresh);
        fresh
    }
}
