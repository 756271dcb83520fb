//! Slot extraction: entity, city, radius and numeric filters
//!
//! Extraction never fails. Whatever cannot be read from the question is left
//! out, and an entity-scoped question without an entity becomes `UNKNOWN`.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::classifier::{
    CURRENCY_AMOUNT, FUZZY_RATING_QUALIFIERS, PRICE_KEYWORDS, RATING_KEYWORDS, default_rules,
};
use super::dictionary::EntityDictionary;
use crate::config::SearchConfig;
use crate::models::{Comparison, FilterAttribute, IntentKind, NumericFilter, ParsedQuestion};

static RADIUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:公里|千米|km)").expect("radius pattern is valid")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

static CLAUSE_CONNECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"并且|而且|同时|且|和|还|，|、|,").expect("connector pattern is valid")
});

const SIMILAR_MARKERS: &[&str] = &["类似", "相似", "同类"];

/// Words removed when the city has to be dug out of a listing question
const CITY_FILLER_WORDS: &[&str] = &[
    "请问", "我想知道", "推荐一下", "推荐", "一下", "有哪些", "有什么", "哪些", "什么", "好玩的",
    "好玩", "景点", "旅游", "地方", "值得去", "的", "去", "在", "吗", "呢", "啊",
];

/// Units that mark a number as not being a ticket price
const DISTANCE_UNITS: &[&str] = &["公里", "千米", "km"];

/// Units that mark a number as not being a rating
const NON_RATING_UNITS: &[&str] = &["元", "块", "公里", "千米", "km"];

/// Operator words for price constraints; negated forms come first
const PRICE_OPERATORS: &[(&str, Comparison)] = &[
    ("不低于", Comparison::Ge),
    ("不小于", Comparison::Ge),
    ("不少于", Comparison::Ge),
    ("不超过", Comparison::Le),
    ("不高于", Comparison::Le),
    ("不大于", Comparison::Le),
    ("不到", Comparison::Le),
    ("至少", Comparison::Ge),
    ("至多", Comparison::Le),
    ("最多", Comparison::Le),
    ("以内", Comparison::Le),
    ("以下", Comparison::Le),
    ("低于", Comparison::Le),
    ("小于", Comparison::Le),
    ("少于", Comparison::Le),
    ("高于", Comparison::Gt),
    ("大于", Comparison::Gt),
    ("超过", Comparison::Gt),
    ("多于", Comparison::Gt),
    ("以上", Comparison::Gt),
];

/// Operator words for rating constraints; negated forms come first
const RATING_OPERATORS: &[(&str, Comparison)] = &[
    ("不低于", Comparison::Ge),
    ("不小于", Comparison::Ge),
    ("不少于", Comparison::Ge),
    ("不超过", Comparison::Le),
    ("不高于", Comparison::Le),
    ("不大于", Comparison::Le),
    ("不到", Comparison::Lt),
    ("不足", Comparison::Lt),
    ("至少", Comparison::Ge),
    ("以上", Comparison::Ge),
    ("至多", Comparison::Le),
    ("最多", Comparison::Le),
    ("以内", Comparison::Le),
    ("低于", Comparison::Lt),
    ("小于", Comparison::Lt),
    ("少于", Comparison::Lt),
    ("以下", Comparison::Lt),
    ("高于", Comparison::Gt),
    ("大于", Comparison::Gt),
    ("超过", Comparison::Gt),
];

const FUZZY_RATING_THRESHOLD: f64 = 4.5;
const MAX_RATING: f64 = 5.0;

/// Radius named in a nearby question, with the built-in defaults
#[must_use]
pub fn extract_radius(text: &str) -> f64 {
    EntityExtractor::default().radius(text)
}

/// Fills a [`ParsedQuestion`] for an already classified question
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    default_radius_km: f64,
    max_radius_km: f64,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl EntityExtractor {
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            default_radius_km: config.default_radius_km,
            max_radius_km: config.max_radius_km,
        }
    }

    /// Radius in kilometres: the first "N公里" in the text, capped to the
    /// maximum. Missing or non-positive values give the default.
    #[must_use]
    pub fn radius(&self, text: &str) -> f64 {
        let text = text.to_lowercase();
        let parsed = RADIUS
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|r| r.is_finite() && *r > 0.0);

        match parsed {
            Some(radius) => radius.min(self.max_radius_km),
            None => self.default_radius_km,
        }
    }

    pub fn extract(
        &self,
        intent: IntentKind,
        question: &str,
        dictionary: &EntityDictionary,
    ) -> ParsedQuestion {
        let text = question.trim().to_lowercase();

        let parsed = match intent {
            IntentKind::Nearby => match dictionary.lookup_entity(&text) {
                Some(name) => {
                    let mut parsed = ParsedQuestion::new(intent, question).with_entity(name);
                    parsed.radius_km = Some(self.radius(&text));
                    parsed.similar_only = SIMILAR_MARKERS.iter().any(|m| text.contains(m));
                    parsed
                }
                None => ParsedQuestion::unknown(question),
            },
            IntentKind::CitySpots => match resolve_city(&text, dictionary) {
                Some(city) => ParsedQuestion::new(intent, question).with_city(city),
                None => ParsedQuestion::unknown(question),
            },
            IntentKind::CompoundFilter => match resolve_city(&text, dictionary) {
                Some(city) => {
                    let mut parsed = ParsedQuestion::new(intent, question).with_city(city);
                    parsed.numeric_filters = extract_filters(&text);
                    parsed
                }
                None => ParsedQuestion::unknown(question),
            },
            IntentKind::Unknown => {
                let parsed = ParsedQuestion::unknown(question);
                match dictionary.lookup_entity(&text) {
                    Some(name) => parsed.with_entity(name),
                    None => parsed,
                }
            }
            scoped if scoped.is_entity_scoped() => match dictionary.lookup_entity(&text) {
                Some(name) => ParsedQuestion::new(scoped, question).with_entity(name),
                None => ParsedQuestion::unknown(question),
            },
            _ => ParsedQuestion::unknown(question),
        };

        debug!(
            "Extracted intent={} entity={:?} city={:?} filters={}",
            parsed.intent,
            parsed.entity_name,
            parsed.city_name,
            parsed.numeric_filters.len()
        );
        parsed
    }
}

/// City from the dictionary, or the residue left after removing listing words
fn resolve_city(text: &str, dictionary: &EntityDictionary) -> Option<String> {
    if let Some(city) = dictionary.lookup_city(text) {
        return Some(city);
    }

    let mut residue = text.to_string();
    for rule in default_rules()
        .iter()
        .filter(|rule| rule.intent == IntentKind::CitySpots)
    {
        for trigger in &rule.keywords {
            residue = residue.replace(trigger.as_str(), "");
        }
    }
    for filler in CITY_FILLER_WORDS {
        residue = residue.replace(filler, "");
    }
    let residue = collapse_doubled(&residue.chars().filter(|c| c.is_alphanumeric()).collect::<String>());

    if residue.is_empty() {
        return None;
    }
    dictionary.lookup_city(&residue).or(Some(residue))
}

/// "北京北京" -> "北京"
fn collapse_doubled(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let half = chars.len() / 2;
    if half > 0 && chars.len() % 2 == 0 && chars[..half] == chars[half..] {
        chars[..half].iter().collect()
    } else {
        token.to_string()
    }
}

/// Price and rating filters, at most one of each
fn extract_filters(text: &str) -> Vec<NumericFilter> {
    let windows = attribute_windows(text);
    let mut filters = Vec::new();

    if let Some(filter) = price_filter(text, &windows) {
        filters.push(filter);
    }
    if let Some(filter) = rating_filter(&windows) {
        filters.push(filter);
    }
    filters
}

fn clauses(text: &str) -> impl Iterator<Item = &str> {
    CLAUSE_CONNECTOR
        .split(text)
        .map(str::trim)
        .filter(|c| !c.is_empty())
}

/// Positions where a price or rating constraint starts within a clause
fn anchors(clause: &str) -> Vec<(usize, FilterAttribute)> {
    let mut found: Vec<(usize, FilterAttribute)> = Vec::new();

    for keyword in PRICE_KEYWORDS {
        found.extend(clause.match_indices(keyword).map(|(i, _)| (i, FilterAttribute::Price)));
    }
    for keyword in RATING_KEYWORDS {
        found.extend(clause.match_indices(keyword).map(|(i, _)| (i, FilterAttribute::Rating)));
    }
    for qualifier in FUZZY_RATING_QUALIFIERS {
        // "最高100元" is a price bound, not a rating qualifier
        found.extend(
            clause
                .match_indices(qualifier)
                .filter(|(i, q)| {
                    !clause[i + q.len()..]
                        .trim_start()
                        .starts_with(|c: char| c.is_ascii_digit())
                })
                .map(|(i, _)| (i, FilterAttribute::Rating)),
        );
    }

    found.sort_by_key(|(i, _)| *i);
    found.dedup_by_key(|(i, _)| *i);
    found.dedup_by(|next, prev| next.1 == prev.1);
    found
}

/// Cut the text into per-attribute windows at connectors and at every
/// switch between price and rating keywords.
fn attribute_windows(text: &str) -> Vec<(FilterAttribute, &str)> {
    let mut windows = Vec::new();

    for clause in clauses(text) {
        let anchors = anchors(clause);
        if anchors.is_empty() {
            if CURRENCY_AMOUNT.is_match(clause) {
                windows.push((FilterAttribute::Price, clause));
            }
            continue;
        }

        for (i, &(position, attribute)) in anchors.iter().enumerate() {
            let start = if i == 0 { 0 } else { position };
            let end = anchors.get(i + 1).map_or(clause.len(), |next| next.0);
            windows.push((attribute, &clause[start..end]));
        }
    }

    windows
}

/// First number in `window` not directly followed by one of `excluded_units`
fn first_number(window: &str, excluded_units: &[&str]) -> Option<f64> {
    NUMBER
        .find_iter(window)
        .filter(|m| {
            let rest = window[m.end()..].trim_start();
            !excluded_units.iter().any(|unit| rest.starts_with(unit))
        })
        .find_map(|m| m.as_str().parse::<f64>().ok())
}

fn operator_in(window: &str, table: &[(&str, Comparison)]) -> Option<Comparison> {
    table
        .iter()
        .find(|(word, _)| window.contains(word))
        .map(|(_, op)| *op)
}

fn price_filter(text: &str, windows: &[(FilterAttribute, &str)]) -> Option<NumericFilter> {
    let price_windows: Vec<&str> = windows
        .iter()
        .filter(|(attribute, _)| *attribute == FilterAttribute::Price)
        .map(|(_, window)| *window)
        .collect();

    if price_windows.iter().any(|w| w.contains("免费")) {
        return Some(NumericFilter::new(FilterAttribute::Price, Comparison::Le, 0.0));
    }

    for window in &price_windows {
        if let Some(value) = first_number(window, DISTANCE_UNITS) {
            let operator = operator_in(window, PRICE_OPERATORS).unwrap_or(Comparison::Le);
            return Some(NumericFilter::new(FilterAttribute::Price, operator, value));
        }
    }

    // "评分4以上50元以下": the amount sits in a rating window
    let amount = CURRENCY_AMOUNT.find(text)?;
    let value = NUMBER
        .find(amount.as_str())
        .and_then(|m| m.as_str().parse::<f64>().ok())?;
    let operator = operator_in(&text[amount.start()..], PRICE_OPERATORS)
        .or_else(|| operator_in(&text[..amount.start()], PRICE_OPERATORS))
        .unwrap_or(Comparison::Le);
    Some(NumericFilter::new(FilterAttribute::Price, operator, value))
}

fn rating_filter(windows: &[(FilterAttribute, &str)]) -> Option<NumericFilter> {
    let rating_windows: Vec<&str> = windows
        .iter()
        .filter(|(attribute, _)| *attribute == FilterAttribute::Rating)
        .map(|(_, window)| *window)
        .collect();

    for window in &rating_windows {
        if let Some(value) = first_number(window, NON_RATING_UNITS) {
            if !(0.0..=MAX_RATING).contains(&value) {
                debug!("Ignoring out-of-range rating {}", value);
                return None;
            }
            let operator = operator_in(window, RATING_OPERATORS).unwrap_or(Comparison::Ge);
            return Some(NumericFilter::new(FilterAttribute::Rating, operator, value));
        }
    }

    rating_windows
        .iter()
        .any(|w| FUZZY_RATING_QUALIFIERS.iter().any(|q| w.contains(q)))
        .then(|| {
            NumericFilter::new(FilterAttribute::Rating, Comparison::Ge, FUZZY_RATING_THRESHOLD)
        })
}
