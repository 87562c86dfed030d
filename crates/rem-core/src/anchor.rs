use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONTAMINATION_INTERFERENCE, MIN_ANCHOR_CHARS, NEUTRAL_INTERFERENCE, PURE_QUALIA_INTERFERENCE,
};
use crate::lexicon::{self, Lexicon};
use crate::provider::{EmbeddingProvider, ProviderError, is_structural, stable_hash};
use crate::tokenizer::alphabetic_tokens;

/// Origin tag carried by every anchor, whichever strategy produced it.
pub const ANCHOR_ORIGIN: &str = "global_description";

/// A salient token with its conceptual-contamination score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LexicalAnchor {
    pub token: String,
    pub embedding: Option<Vec<f32>>,
    /// 0 = pure sensory qualia, 1 = high conceptual contamination.
    pub interference_score: f64,
    pub temporal_position: usize,
    pub origin_tag: String,
}

impl LexicalAnchor {
    /// `1 - interference`.
    pub fn salience(&self) -> f64 {
        1.0 - self.interference_score
    }
}

/// Ordered anchors of one text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorSet {
    pub anchors: Vec<LexicalAnchor>,
}

impl AnchorSet {
    fn from_parts(parts: Vec<(String, Vec<f32>)>, lexicon: &Lexicon) -> Self {
        let anchors = parts
            .into_iter()
            .enumerate()
            .map(|(i, (token, embedding))| LexicalAnchor {
                interference_score: interference_score(&token, lexicon),
                token,
                embedding: Some(embedding),
                temporal_position: i,
                origin_tag: ANCHOR_ORIGIN.to_string(),
            })
            .collect();
        Self { anchors }
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.anchors.iter().map(|a| a.token.as_str()).collect()
    }

    pub fn embeddings(&self) -> Vec<Option<&[f32]>> {
        self.anchors
            .iter()
            .map(|a| a.embedding.as_deref())
            .collect()
    }

    pub fn interference_scores(&self) -> Vec<f64> {
        self.anchors.iter().map(|a| a.interference_score).collect()
    }

    /// Mean interference, or `None` with no anchors.
    pub fn mean_interference(&self) -> Option<f64> {
        if self.anchors.is_empty() {
            return None;
        }
        let sum: f64 = self.anchors.iter().map(|a| a.interference_score).sum();
        Some((sum / self.anchors.len() as f64).clamp(0.0, 1.0))
    }
}

/// Lexicon lookup: pure qualia 0.2, contamination markers 0.8, else 0.5.
pub fn interference_score(token: &str, lexicon: &Lexicon) -> f64 {
    let lower = token.to_lowercase();
    if lexicon::contains(lexicon.pure_qualia, &lower) {
        PURE_QUALIA_INTERFERENCE
    } else if lexicon::contains(lexicon.contamination_markers, &lower) {
        CONTAMINATION_INTERFERENCE
    } else {
        NEUTRAL_INTERFERENCE
    }
}

/// Strategy interface: pick salient tokens of `text` and score them.
pub trait AnchorExtractor {
    fn extract(&self, text: &str) -> Result<AnchorSet, ProviderError>;
}

/// Fallback strategy: content words from the lexicon, placeholder vectors.
pub struct LexiconAnchors<'a> {
    lexicon: &'a Lexicon,
    limit: usize,
    placeholder_dim: usize,
}

impl<'a> LexiconAnchors<'a> {
    pub fn new(lexicon: &'a Lexicon, limit: usize, placeholder_dim: usize) -> Self {
        Self {
            lexicon,
            limit,
            placeholder_dim,
        }
    }

    /// Content words: alphabetic, not a stop word, longer than 3 chars,
    /// in text order with repeats kept, capped at `limit`.
    pub fn content_words(&self, text: &str) -> Vec<String> {
        alphabetic_tokens(text)
            .into_iter()
            .filter(|w| !lexicon::contains(self.lexicon.stop_words, w))
            .filter(|w| w.chars().count() > MIN_ANCHOR_CHARS)
            .take(self.limit)
            .collect()
    }
}

impl AnchorExtractor for LexiconAnchors<'_> {
    fn extract(&self, text: &str) -> Result<AnchorSet, ProviderError> {
        let parts = self
            .content_words(text)
            .into_iter()
            .map(|w| {
                let embedding = placeholder_embedding(&w, self.placeholder_dim);
                (w, embedding)
            })
            .collect();
        Ok(AnchorSet::from_parts(parts, self.lexicon))
    }
}

/// Provider-backed strategy: the provider's tokens, filtered, keeping the
/// `limit` largest-norm vectors.
pub struct ProviderAnchors<'a> {
    provider: &'a dyn EmbeddingProvider,
    lexicon: &'a Lexicon,
    limit: usize,
}

impl<'a> ProviderAnchors<'a> {
    pub fn new(provider: &'a dyn EmbeddingProvider, lexicon: &'a Lexicon, limit: usize) -> Self {
        Self {
            provider,
            lexicon,
            limit,
        }
    }
}

impl AnchorExtractor for ProviderAnchors<'_> {
    fn extract(&self, text: &str) -> Result<AnchorSet, ProviderError> {
        let candidates: Vec<(String, Vec<f32>)> = self
            .provider
            .embed(text)?
            .into_iter()
            .filter(|t| !is_structural(&t.token))
            .map(|t| (t.token, t.vector))
            .collect();

        let kept = select_by_norm(candidates, self.limit);
        Ok(AnchorSet::from_parts(kept, self.lexicon))
    }
}

/// Keep the `limit` entries with the largest vector norm (ties: first
/// occurrence wins), returned in their original order.
fn select_by_norm(candidates: Vec<(String, Vec<f32>)>, limit: usize) -> Vec<(String, Vec<f32>)> {
    if candidates.len() <= limit {
        return candidates;
    }

    let norms: Vec<f64> = candidates
        .iter()
        .map(|(_, v)| {
            let n = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
            if n.is_finite() { n } else { 0.0 }
        })
        .collect();

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    // Stable sort: equal norms keep index order.
    order.sort_by(|&a, &b| norms[b].total_cmp(&norms[a]));
    let mut keep: Vec<usize> = order.into_iter().take(limit).collect();
    keep.sort_unstable();

    let mut keep_iter = keep.into_iter().peekable();
    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(i, c)| {
            if keep_iter.peek() == Some(&i) {
                keep_iter.next();
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Deterministic standard-normal vector seeded by the token.
pub fn placeholder_embedding(token: &str, dim: usize) -> Vec<f32> {
    let mut rng = SmallRng::seed_from_u64(stable_hash(token.as_bytes()));
    (0..dim).map(|_| gauss_random(&mut rng) as f32).collect()
}

/// Box-Muller standard normal.
fn gauss_random(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
