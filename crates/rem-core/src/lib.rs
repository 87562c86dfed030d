//! REMForge experiential record pipeline.
//!
//! Turns a raw text into a versioned, nested "experiential record":
//! clause segmentation, lexical anchors with interference scores, noetic
//! (intentional) invariants, a qualia signature, a semantic/phenomenal
//! affect split, and multiscale and visualization views over all of it.
//!
//! Zero I/O. Deterministic apart from the record id and creation timestamp.

pub mod affect;
pub mod anchor;
pub mod assemble;
pub mod clause;
pub mod config;
pub mod constants;
pub mod error;
pub mod forge;
pub mod lexicon;
pub mod noetic;
pub mod normalize;
pub mod provider;
pub mod qualia;
pub mod record;
pub mod serde_compat;
pub mod time;
pub mod tokenizer;

pub use affect::{AffectSplit, split_affect};
pub use anchor::{AnchorExtractor, AnchorSet, LexicalAnchor, LexiconAnchors, ProviderAnchors};
pub use assemble::{Assembler, StageOutputs};
pub use clause::{Clause, Segmenter, segment};
pub use config::{ForgeConfig, Tier};
pub use constants::SCHEMA_VERSION;
pub use error::{ForgeError, Stage};
pub use forge::{Forge, forge};
pub use lexicon::{Language, Lexicon};
pub use noetic::{Directedness, NoeticInvariantSet, NoeticMode, extract_noetic};
pub use normalize::normalize;
pub use provider::{
    EmbeddingProvider, HashingProvider, ProviderError, Sentiment, SentimentLabel, TokenEmbedding,
};
pub use qualia::{QualiaModality, QualiaSignature, build_qualia_signature};
pub use record::ExperientialRecord;
pub use serde_compat::{CURRENT_VERSION, export_json, import_json, is_compatible};
pub use tokenizer::tokenize;
