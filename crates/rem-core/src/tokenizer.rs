use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s']").unwrap());
static APOSTROPHE_TRIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'+|'+$").unwrap());
static ALPHABETIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Alphabetic}+").unwrap());

/// Tokenize text into lowercase words.
/// Preserves apostrophes within words (e.g., "don't").
/// No stemming, no stop-word removal: lexicon lookups match surface forms.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned = NON_WORD.replace_all(text, " ");
    cleaned
        .to_lowercase()
        .split_whitespace()
        .map(|t| APOSTROPHE_TRIM.replace_all(t, "").to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Distinct lowercase tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Maximal runs of alphabetic characters, lowercased, in text order.
/// Digits, apostrophes and underscores split tokens.
pub fn alphabetic_tokens(text: &str) -> Vec<String> {
    ALPHABETIC
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenize() {
        let tokens = tokenize("Hello, world!");
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn test_apostrophe_preserved() {
        let tokens = tokenize("Don't stop!");
        assert_eq!(tokens, vec!["don't", "stop"]);
    }

    #[test]
    fn test_leading_trailing_apostrophes_stripped() {
        let tokens = tokenize("'hello' 'world'");
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(token_set("").is_empty());
        assert!(alphabetic_tokens("").is_empty());
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_whitespace_only() {
        let tokens = tokenize("   \t\n  ");
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_punctuation_stripped() {
        let tokens = tokenize("light. calm! red?");
        assert_eq!(tokens, vec!["light", "calm", "red"]);
    }

    #[test]
    fn test_accented_words_kept_whole() {
        let tokens = tokenize("Siento el frío aquí.");
        assert_eq!(tokens, vec!["siento", "el", "frío", "aquí"]);
    }

    #[test]
    fn test_token_set_dedupes() {
        let set = token_set("red Red RED blue");
        assert_eq!(set.len(), 2);
        assert!(set.contains("red"));
    }

    #[test]
    fn test_alphabetic_tokens_drop_digits() {
        let tokens = alphabetic_tokens("Room 101 was cold_and dark");
        assert_eq!(tokens, vec!["room", "was", "cold", "and", "dark"]);
    }

    #[test]
    fn test_word_count_counts_punctuation_runs() {
        assert_eq!(word_count("I see a bright red light."), 6);
        assert_eq!(word_count("!!!"), 1);
    }

    #[test]
    fn test_no_stop_word_removal() {
        let tokens = tokenize("the a an is are was");
        assert_eq!(tokens, vec!["the", "a", "an", "is", "are", "was"]);
    }
}
