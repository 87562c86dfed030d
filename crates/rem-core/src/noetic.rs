//! Noetic invariants: which intentional stance a text takes, where it
//! points, and how that stance moves across clauses.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::clause::Clause;
use crate::constants::{CLAUSE_LENGTH_NORM, INVARIANT_CLAUSE_LIMIT, SHIFT_THRESHOLD, TEMPORAL_CLAUSE_LIMIT};
use crate::lexicon::{self, Lexicon};
use crate::tokenizer::token_set;

/// Intentional mode of an utterance. Declaration order is the tie-break
/// order for [`extract_noetic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoeticMode {
    #[default]
    Perception,
    Memory,
    Imagination,
    Reflection,
    Language,
    Action,
}

impl NoeticMode {
    pub const COUNT: usize = 6;

    pub const ALL: [NoeticMode; Self::COUNT] = [
        Self::Perception,
        Self::Memory,
        Self::Imagination,
        Self::Reflection,
        Self::Language,
        Self::Action,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perception => "perception",
            Self::Memory => "memory",
            Self::Imagination => "imagination",
            Self::Reflection => "reflection",
            Self::Language => "language",
            Self::Action => "action",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

/// Sensory modality the experience is directed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Directedness {
    #[serde(rename = "qualia_visual")]
    Visual,
    #[serde(rename = "qualia_auditory")]
    Auditory,
    #[serde(rename = "qualia_haptic")]
    Haptic,
    #[serde(rename = "qualia_gustatory")]
    Gustatory,
    #[serde(rename = "qualia_olfactory")]
    Olfactory,
    #[default]
    #[serde(rename = "general_experience")]
    General,
}

impl Directedness {
    /// Check order; the first modality whose cues appear wins.
    pub const PRIORITY: [Directedness; 5] = [
        Self::Visual,
        Self::Auditory,
        Self::Haptic,
        Self::Gustatory,
        Self::Olfactory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "qualia_visual",
            Self::Auditory => "qualia_auditory",
            Self::Haptic => "qualia_haptic",
            Self::Gustatory => "qualia_gustatory",
            Self::Olfactory => "qualia_olfactory",
            Self::General => "general_experience",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Intensification,
    Attenuation,
}

/// Jump in experiential score between adjacent clauses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeShift {
    /// Index of the later clause.
    pub position: usize,
    pub from_intensity: f64,
    pub to_intensity: f64,
    pub shift_type: ShiftType,
}

/// Past-tense clause followed by a present/perceptual one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub position: usize,
    pub from_phase: String,
    pub to_phase: String,
    pub transition_type: String,
}

impl PhaseTransition {
    fn memory_to_perception(position: usize) -> Self {
        Self {
            position,
            from_phase: "past".to_string(),
            to_phase: "present".to_string(),
            transition_type: "memory_to_perception".to_string(),
        }
    }
}

/// `[experiential_score, self_reference, dominant_mode_marker, position, length]`
pub type InvariantVector = [f64; 5];

/// `[retention, present, protention]`
pub type TemporalVector = [f64; 3];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoeticInvariantSet {
    pub dominant_mode: NoeticMode,
    pub directedness: Directedness,
    /// At most the first five clauses.
    pub per_clause_vectors: Vec<InvariantVector>,
    pub shifts: Vec<ModeShift>,
    pub phase_transitions: Vec<PhaseTransition>,
    /// At most the first three clauses.
    pub temporal_vectors: Vec<TemporalVector>,
}

/// Extract the noetic invariants of `clauses`. `text` is the full
/// normalized text, used for directedness.
pub fn extract_noetic(text: &str, clauses: &[Clause], lexicon: &Lexicon) -> NoeticInvariantSet {
    let clause_tokens: Vec<HashSet<String>> = clauses.iter().map(Clause::tokens).collect();

    let dominant_mode = dominant_mode(clauses, &clause_tokens, lexicon);
    let directedness = directedness(&token_set(text), lexicon);

    let n = clauses.len().max(1) as f64;
    let dominant_markers = lexicon.mode_markers(dominant_mode);
    let per_clause_vectors = clauses
        .iter()
        .zip(&clause_tokens)
        .take(INVARIANT_CLAUSE_LIMIT)
        .enumerate()
        .map(|(i, (clause, tokens))| {
            [
                clause.experiential_score,
                flag(lexicon::any_hit(lexicon.first_person, tokens)),
                flag(lexicon::any_hit(dominant_markers, tokens)),
                i as f64 / n,
                length_norm(clause.length_in_words),
            ]
        })
        .collect();

    let temporal_vectors = clauses
        .iter()
        .zip(&clause_tokens)
        .take(TEMPORAL_CLAUSE_LIMIT)
        .map(|(clause, tokens)| {
            [
                marker_weight(lexicon::any_hit(lexicon.retention_markers, tokens)),
                clause.experiential_score,
                marker_weight(lexicon::any_hit(lexicon.protention_markers, tokens)),
            ]
        })
        .collect();

    NoeticInvariantSet {
        dominant_mode,
        directedness,
        per_clause_vectors,
        shifts: detect_shifts(clauses),
        phase_transitions: detect_phase_transitions(&clause_tokens, lexicon),
        temporal_vectors,
    }
}

/// Sum each clause's score into every mode whose markers it contains, then
/// take the arg-max. All-zero defaults to perception; ties go to the earlier
/// mode.
fn dominant_mode(clauses: &[Clause], clause_tokens: &[HashSet<String>], lexicon: &Lexicon) -> NoeticMode {
    let mut acc = [0.0f64; NoeticMode::COUNT];
    for (clause, tokens) in clauses.iter().zip(clause_tokens) {
        for mode in NoeticMode::ALL {
            if lexicon::any_hit(lexicon.mode_markers(mode), tokens) {
                acc[mode.index()] += clause.experiential_score;
            }
        }
    }

    let mut best = NoeticMode::Perception;
    let mut best_score = 0.0;
    for mode in NoeticMode::ALL {
        if acc[mode.index()] > best_score {
            best = mode;
            best_score = acc[mode.index()];
        }
    }
    best
}

fn directedness(tokens: &HashSet<String>, lexicon: &Lexicon) -> Directedness {
    Directedness::PRIORITY
        .into_iter()
        .find(|d| lexicon::any_hit(lexicon.directedness_cues(*d), tokens))
        .unwrap_or(Directedness::General)
}

fn detect_shifts(clauses: &[Clause]) -> Vec<ModeShift> {
    clauses
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let (prev, curr) = (pair[0].experiential_score, pair[1].experiential_score);
            ((curr - prev).abs() > SHIFT_THRESHOLD).then(|| ModeShift {
                position: i + 1,
                from_intensity: prev,
                to_intensity: curr,
                shift_type: if curr > prev {
                    ShiftType::Intensification
                } else {
                    ShiftType::Attenuation
                },
            })
        })
        .collect()
}

fn detect_phase_transitions(clause_tokens: &[HashSet<String>], lexicon: &Lexicon) -> Vec<PhaseTransition> {
    clause_tokens
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| {
            lexicon::any_hit(lexicon.past_markers, &pair[0])
                && lexicon::any_hit(lexicon.present_markers, &pair[1])
        })
        .map(|(i, _)| PhaseTransition::memory_to_perception(i + 1))
        .collect()
}

fn flag(hit: bool) -> f64 {
    if hit { 1.0 } else { 0.0 }
}

fn marker_weight(hit: bool) -> f64 {
    if hit { 1.0 } else { 0.3 }
}

/// Word count over 20, capped at 1.
pub(crate) fn length_norm(words: usize) -> f64 {
    (words as f64 / CLAUSE_LENGTH_NORM).min(1.0)
}
