//! Dictionary-driven segmentation
//!
//! Questions are mostly unspaced Chinese, so word boundaries come from the
//! dictionary itself: forward maximum matching over every letter/digit run.

use regex::Regex;
use std::sync::LazyLock;

static WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("word run pattern is valid"));

/// Split `text` into tokens, preferring the longest dictionary word at each position.
///
/// `max_len` is the longest dictionary word in characters. Characters that
/// start no dictionary word become single-character tokens.
pub fn segment<F>(text: &str, max_len: usize, is_word: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut tokens = Vec::new();

    for run in WORD_RUN.find_iter(text) {
        let chars: Vec<char> = run.as_str().chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let upper = max_len.min(chars.len() - i).max(1);
            let mut taken = 1;
            for len in (1..=upper).rev() {
                let candidate: String = chars[i..i + len].iter().collect();
                if is_word(&candidate) {
                    taken = len;
                    break;
                }
            }
            tokens.push(chars[i..i + taken].iter().collect());
            i += taken;
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn words() -> HashSet<&'static str> {
        ["天安门", "故宫", "故宫博物院", "附近"].into_iter().collect()
    }

    #[test]
    fn test_prefers_longest_word() {
        let dict = words();
        let tokens = segment("故宫博物院门票", 5, |w| dict.contains(w));
        assert_eq!(tokens[0], "故宫博物院");
    }

    #[test]
    fn test_splits_on_punctuation_and_digits() {
        let dict = words();
        let tokens = segment("天安门附近5公里，有什么？", 5, |w| dict.contains(w));
        assert_eq!(&tokens[..2], &["天安门".to_string(), "附近".to_string()]);
        assert!(tokens.iter().all(|t| t != "，" && t != "？"));
    }

    #[test]
    fn test_unknown_text_becomes_single_chars() {
        let tokens = segment("你好", 5, |_| false);
        assert_eq!(tokens, vec!["你", "好"]);
    }

    #[test]
    fn test_latin_runs() {
        let dict: HashSet<&str> = ["disneyland"].into_iter().collect();
        let tokens = segment("shanghai disneyland", 10, |w| dict.contains(w));
        assert!(tokens.contains(&"disneyland".to_string()));
    }
}
