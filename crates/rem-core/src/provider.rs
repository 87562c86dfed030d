//! Embedding / sentiment provider capability.
//!
//! ```text
//! EmbeddingProvider (trait)
//! ├── name() -> &str                                  // identifier for logs
//! ├── embed(&str) -> Result<Vec<TokenEmbedding>>      // token + vector pairs
//! └── sentiment(&str) -> Option<Result<Sentiment>>    // None = capability absent
//! ```
//!
//! The forge treats every provider failure as recoverable: it logs a
//! degraded-mode notice and substitutes the lexicon strategy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tokenizer::tokenize;

/// Provider-level failure. Never surfaced by [`crate::Forge::forge`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The provider could not be constructed (missing model, bad weights...).
    Unavailable(String),
    /// A single call failed.
    Call(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable(msg) => write!(f, "provider unavailable: {msg}"),
            ProviderError::Call(msg) => write!(f, "provider call failed: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One provider token with its vector.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenEmbedding {
    pub token: String,
    pub vector: Vec<f32>,
}

impl TokenEmbedding {
    pub fn new(token: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            token: token.into(),
            vector,
        }
    }

    /// Euclidean norm of the vector.
    pub fn norm(&self) -> f64 {
        self.vector
            .iter()
            .map(|x| (*x as f64) * (*x as f64))
            .sum::<f64>()
            .sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
}

/// Provider sentiment: a label with a confidence in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    /// `+score` for positive, `-score` for negative, clamped to `[-1, 1]`.
    /// Non-finite scores read as neutral.
    pub fn signed_valence(&self) -> f64 {
        if !self.score.is_finite() {
            return 0.0;
        }
        let score = self.score.clamp(0.0, 1.0);
        match self.label {
            SentimentLabel::Positive => score,
            SentimentLabel::Negative => -score,
        }
    }
}

/// Capability interface for learned (or learned-like) token embeddings.
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Tokenize and embed `text`. Tokens may include structural markers
    /// and subword continuations; the anchor extractor filters them.
    fn embed(&self, text: &str) -> Result<Vec<TokenEmbedding>, ProviderError>;

    /// Sentiment of the whole text. `None` means the capability is absent.
    fn sentiment(&self, _text: &str) -> Option<Result<Sentiment, ProviderError>> {
        None
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a. Fixed across toolchains, so archived embeddings stay
/// reproducible.
pub fn stable_hash(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |h, b| {
        (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Tokens a provider may emit that never become anchors.
pub const STRUCTURAL_MARKERS: &[&str] = &[
    "[CLS]", "[SEP]", "[PAD]", "[UNK]", "[MASK]", "<s>", "</s>", "<pad>", "<unk>",
];

/// True for structural/padding markers and `##` subword continuations.
pub fn is_structural(token: &str) -> bool {
    STRUCTURAL_MARKERS.contains(&token) || token.starts_with("##") || token.trim().is_empty()
}

/// Deterministic in-process provider: lowercase word tokens embedded by
/// hashing character trigrams into a fixed number of buckets.
///
/// Vectors are not normalized, so longer tokens carry larger norms.
/// Offers no sentiment capability.
#[derive(Clone, Debug)]
pub struct HashingProvider {
    dim: usize,
}

impl HashingProvider {
    pub const DEFAULT_DIM: usize = 64;

    pub fn new(dim: usize) -> Result<Self, ProviderError> {
        if dim == 0 {
            return Err(ProviderError::Unavailable(
                "hashing provider needs a non-zero dimension".to_string(),
            ));
        }
        Ok(Self { dim })
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    fn embed_token(&self, token: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let padded: Vec<char> = format!("^{token}$").chars().collect();

        for (i, window) in padded.windows(3.min(padded.len())).enumerate() {
            let trigram: String = window.iter().collect();
            let h = stable_hash(trigram.as_bytes());

            for j in 0..4 {
                let idx = ((h >> (j * 8)) as usize + i * 17) % self.dim;
                let sign = if (h >> (j + 48)) & 1 == 0 { 1.0 } else { -1.0 };
                vector[idx] += sign * 0.25;
            }
        }

        vector
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self {
            dim: Self::DEFAULT_DIM,
        }
    }
}

impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing-trigram"
    }

    fn embed(&self, text: &str) -> Result<Vec<TokenEmbedding>, ProviderError> {
        Ok(tokenize(text)
            .into_iter()
            .map(|token| {
                let vector = self.embed_token(&token);
                TokenEmbedding { token, vector }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_markers() {
        assert!(is_structural("[CLS]"));
        assert!(is_structural("</s>"));
        assert!(is_structural("##ing"));
        assert!(is_structural(" "));
        assert!(!is_structural("light"));
    }

    #[test]
    fn test_signed_valence() {
        let pos = Sentiment {
            label: SentimentLabel::Positive,
            score: 0.9,
        };
        let neg = Sentiment {
            label: SentimentLabel::Negative,
            score: 1.7,
        };
        let nan = Sentiment {
            label: SentimentLabel::Negative,
            score: f64::NAN,
        };
        assert!((pos.signed_valence() - 0.9).abs() < 1e-12);
        assert_eq!(neg.signed_valence(), -1.0);
        assert_eq!(nan.signed_valence(), 0.0);
    }

    #[test]
    fn test_hashing_provider_deterministic() {
        let p = HashingProvider::default();
        let a = p.embed("I see a bright red light").unwrap();
        let b = p.embed("I see a bright red light").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.iter().all(|t| t.vector.len() == HashingProvider::DEFAULT_DIM));
    }

    #[test]
    fn test_hashing_provider_lowercases() {
        let p = HashingProvider::new(16).unwrap();
        let out = p.embed("Bright LIGHT").unwrap();
        assert_eq!(out[0].token, "bright");
        assert_eq!(out[1].token, "light");
        assert_eq!(out[0].vector.len(), 16);
    }

    #[test]
    fn test_hashing_provider_rejects_zero_dim() {
        assert!(matches!(
            HashingProvider::new(0),
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn test_hashing_provider_has_no_sentiment() {
        assert!(HashingProvider::default().sentiment("good").is_none());
    }

    #[test]
    fn test_stable_hash_known_values() {
        assert_eq!(stable_hash(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(stable_hash(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(stable_hash(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_norm() {
        let t = TokenEmbedding::new("x", vec![3.0, 4.0]);
        assert!((t.norm() - 5.0).abs() < 1e-12);
    }
}
