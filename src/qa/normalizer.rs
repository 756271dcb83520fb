//! Question rewriting applied when the first parse finds nothing

use std::collections::BTreeMap;

/// Rewrites a question into a form the classifier understands better
pub trait QuestionNormalizer: Send + Sync {
    fn normalize(&self, question: &str) -> String;
}

/// Leaves every question untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNormalizer;

impl QuestionNormalizer for NoopNormalizer {
    fn normalize(&self, question: &str) -> String {
        question.to_string()
    }
}

/// Replaces configured aliases and abbreviations with canonical attraction names
#[derive(Debug, Clone, Default)]
pub struct AliasNormalizer {
    /// (alias, canonical), longest alias first
    aliases: Vec<(String, String)>,
}

impl AliasNormalizer {
    pub fn new<I>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut aliases: Vec<(String, String)> = aliases
            .into_iter()
            .map(|(alias, canonical)| (alias.trim().to_string(), canonical.trim().to_string()))
            .filter(|(alias, canonical)| !alias.is_empty() && !canonical.is_empty())
            .collect();
        aliases.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });
        Self { aliases }
    }

    #[must_use]
    pub fn from_config(aliases: &BTreeMap<String, String>) -> Self {
        Self::new(aliases.iter().map(|(a, c)| (a.clone(), c.clone())))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl QuestionNormalizer for AliasNormalizer {
    fn normalize(&self, question: &str) -> String {
        let mut output = String::with_capacity(question.len());
        let mut rest = question;

        'scan: while let Some(c) = rest.chars().next() {
            for (alias, canonical) in &self.aliases {
                // "故宫博物院" already contains the alias "故宫"
                if rest.starts_with(canonical.as_str()) {
                    output.push_str(canonical);
                    rest = &rest[canonical.len()..];
                    continue 'scan;
                }
                if rest.starts_with(alias.as_str()) {
                    output.push_str(canonical);
                    rest = &rest[alias.len()..];
                    continue 'scan;
                }
            }
            output.push(c);
            rest = &rest[c.len_utf8()..];
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> AliasNormalizer {
        AliasNormalizer::new(vec![
            ("故宫".to_string(), "故宫博物院".to_string()),
            ("十三陵".to_string(), "明十三陵".to_string()),
            ("大故宫".to_string(), "故宫博物院".to_string()),
        ])
    }

    #[test]
    fn test_noop() {
        assert_eq!(NoopNormalizer.normalize("颐和园门票"), "颐和园门票");
    }

    #[test]
    fn test_expands_alias() {
        assert_eq!(normalizer().normalize("故宫门票多少钱"), "故宫博物院门票多少钱");
        assert_eq!(normalizer().normalize("去十三陵怎么走"), "去明十三陵怎么走");
    }

    #[test]
    fn test_canonical_is_not_expanded_again() {
        assert_eq!(normalizer().normalize("故宫博物院门票"), "故宫博物院门票");
        assert_eq!(normalizer().normalize("明十三陵在哪"), "明十三陵在哪");
    }

    #[test]
    fn test_longest_alias_first() {
        assert_eq!(normalizer().normalize("大故宫的门票"), "故宫博物院的门票");
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let normalizer =
            AliasNormalizer::new(vec![(" ".to_string(), "x".to_string())]);
        assert!(normalizer.is_empty());
        assert_eq!(normalizer.normalize("颐和园"), "颐和园");
    }
}
