use serde::{Deserialize, Serialize};

use crate::lexicon::{self, Lexicon};
use crate::tokenizer::token_set;

/// Two independent valence estimates from disjoint lexicons.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffectSplit {
    pub semantic_valence: f64,
    pub phenomenal_valence: f64,
    pub semantic_count: usize,
    pub phenomenal_count: usize,
    /// Signed provider sentiment, when a provider offered one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_valence: Option<f64>,
}

impl AffectSplit {
    /// Provider sentiment if present, else the phenomenal valence.
    pub fn affective_valence(&self) -> f64 {
        self.sentiment_valence.unwrap_or(self.phenomenal_valence)
    }

    /// Mean of the two lexicon valences.
    pub fn arousal(&self) -> f64 {
        (self.semantic_valence + self.phenomenal_valence) / 2.0
    }
}

/// `clip(hits / words * 2 - 1, -1, 1)` for each lexicon, where `words` is
/// the number of distinct tokens (at least 1).
pub fn split_affect(text: &str, lexicon: &Lexicon) -> AffectSplit {
    let tokens = token_set(text);
    let words = tokens.len().max(1) as f64;

    let semantic_count = lexicon::hits(lexicon.semantic_affect, &tokens);
    let phenomenal_count = lexicon::hits(lexicon.phenomenal_affect, &tokens);

    AffectSplit {
        semantic_valence: valence(semantic_count, words),
        phenomenal_valence: valence(phenomenal_count, words),
        semantic_count,
        phenomenal_count,
        sentiment_valence: None,
    }
}

fn valence(hits: usize, words: f64) -> f64 {
    (hits as f64 / words * 2.0 - 1.0).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{ENGLISH, SPANISH};
    use approx::assert_relative_eq;

    #[test]
    fn test_calm_scenario() {
        let split = split_affect("I see a bright red light. I feel calm.", &ENGLISH);
        assert_eq!(split.phenomenal_count, 1);
        assert_eq!(split.semantic_count, 0);
        // 8 distinct tokens
        assert_relative_eq!(split.phenomenal_valence, 1.0 / 8.0 * 2.0 - 1.0);
        assert_eq!(split.semantic_valence, -1.0);
        assert_eq!(split.affective_valence(), split.phenomenal_valence);
    }

    #[test]
    fn test_empty_text() {
        let split = split_affect("", &ENGLISH);
        assert_eq!(split.semantic_valence, -1.0);
        assert_eq!(split.phenomenal_valence, -1.0);
        assert_eq!(split.arousal(), -1.0);
    }

    #[test]
    fn test_all_hits_saturates() {
        let split = split_affect("good great", &ENGLISH);
        assert_eq!(split.semantic_valence, 1.0);
        assert_eq!(split.phenomenal_valence, -1.0);
        assert_eq!(split.arousal(), 0.0);
    }

    #[test]
    fn test_sentiment_overrides_affective_valence() {
        let mut split = split_affect("astonished", &ENGLISH);
        assert_eq!(split.affective_valence(), 1.0);
        split.sentiment_valence = Some(-0.4);
        assert_eq!(split.affective_valence(), -0.4);
    }

    #[test]
    fn test_spanish_lexicon() {
        let split = split_affect("Estoy maravillado y me gusta", &SPANISH);
        assert_eq!(split.phenomenal_count, 1);
        assert_eq!(split.semantic_count, 1);
    }
}
