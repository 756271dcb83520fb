//! Question answering pipeline
//!
//! A question flows through four stages:
//! 1. [`IntentClassifier`] picks an [`IntentKind`](crate::models::IntentKind)
//! 2. [`EntityExtractor`] fills the slots the intent needs
//! 3. [`QueryDispatcher`] runs the store query
//! 4. [`render`] turns the rows into an answer
//!
//! All stages read one dictionary snapshot per request.

pub mod classifier;
pub mod dictionary;
pub mod dispatcher;
pub mod extractor;
pub mod normalizer;
pub mod renderer;
mod segment;

pub use classifier::{IntentClassifier, IntentRule};
pub use dictionary::{EntityDictionary, SharedDictionary};
pub use dispatcher::QueryDispatcher;
pub use extractor::{EntityExtractor, extract_radius};
pub use normalizer::{AliasNormalizer, NoopNormalizer, QuestionNormalizer};
pub use renderer::{FALLBACK_ANSWER, render};

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::ScenicQaConfig;
use crate::models::{IntentKind, ParsedQuestion};
use crate::storage::AttractionStore;

/// Answers natural-language questions about attractions
pub struct QaService {
    store: Arc<dyn AttractionStore>,
    dictionary: SharedDictionary,
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    dispatcher: QueryDispatcher,
    normalizer: Box<dyn QuestionNormalizer>,
}

impl QaService {
    /// Build the service and load the dictionary from `store`.
    ///
    /// Aliases from the configuration become the normalizer; without any the
    /// service uses [`NoopNormalizer`].
    pub fn new(store: Arc<dyn AttractionStore>, config: &ScenicQaConfig) -> Self {
        let dictionary = SharedDictionary::load(store.as_ref());
        let aliases = AliasNormalizer::from_config(&config.aliases);
        let normalizer: Box<dyn QuestionNormalizer> = if aliases.is_empty() {
            Box::new(NoopNormalizer)
        } else {
            Box::new(aliases)
        };

        Self {
            dispatcher: QueryDispatcher::new(Arc::clone(&store), &config.search),
            extractor: EntityExtractor::from_config(&config.search),
            classifier: IntentClassifier::new(),
            dictionary,
            store,
            normalizer,
        }
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: impl QuestionNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Answer one question. Always returns text, [`FALLBACK_ANSWER`] when
    /// nothing could be found.
    #[instrument(skip(self))]
    pub fn answer(&self, question: &str) -> String {
        let parsed = self.parse(question);
        if !parsed.is_answerable() {
            debug!("Nothing to look up for intent {}", parsed.intent);
            return FALLBACK_ANSWER.to_string();
        }

        let result = self.dispatcher.dispatch(&parsed);
        render(&parsed, &result)
    }

    /// Classify and extract without touching the store
    #[instrument(skip(self))]
    pub fn parse(&self, question: &str) -> ParsedQuestion {
        let dictionary = self.dictionary.get();
        let parsed = self.parse_with(question, &dictionary);

        if parsed.intent != IntentKind::Unknown || parsed.entity_name.is_some() {
            return parsed;
        }

        let normalized = self.normalizer.normalize(question);
        if normalized == question {
            return parsed;
        }

        debug!("Retrying with normalized question: {}", normalized);
        let mut retried = self.parse_with(&normalized, &dictionary);
        retried.raw_text = question.to_string();
        retried.normalized_text = Some(normalized);
        retried
    }

    fn parse_with(&self, question: &str, dictionary: &EntityDictionary) -> ParsedQuestion {
        let intent = self.classifier.classify(question, dictionary);
        self.extractor.extract(intent, question, dictionary)
    }

    /// Rebuild the entity dictionary from the store
    pub fn reload_dictionary(&self) {
        let dictionary = self.dictionary.reload(self.store.as_ref());
        info!(
            "Dictionary now holds {} attractions and {} cities",
            dictionary.attraction_count(),
            dictionary.city_count()
        );
    }

    /// Current dictionary snapshot
    #[must_use]
    pub fn dictionary(&self) -> Arc<EntityDictionary> {
        self.dictionary.get()
    }
}
