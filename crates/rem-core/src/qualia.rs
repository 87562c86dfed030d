//! Qualia signature: which sensory modality a text is "about".

use serde::{Deserialize, Serialize};

use crate::constants::{JND_BASE, JND_STEP, MICRO_VARIATION_TOKENS, SATURATION_HITS};
use crate::lexicon::{self, Lexicon};
use crate::tokenizer::{token_set, tokenize};

/// Qualia modalities in profile order. The order of `intensity_profile`,
/// `invariant_patterns` indices and micro-variation flags follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualiaModality {
    Visual,
    Auditory,
    Haptic,
    Olfactory,
    Gustatory,
    Affective,
}

impl QualiaModality {
    pub const COUNT: usize = 6;

    pub const ALL: [QualiaModality; Self::COUNT] = [
        Self::Visual,
        Self::Auditory,
        Self::Haptic,
        Self::Olfactory,
        Self::Gustatory,
        Self::Affective,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Haptic => "haptic",
            Self::Olfactory => "olfactory",
            Self::Gustatory => "gustatory",
            Self::Affective => "affective",
        }
    }
}

/// Label used when no modality has any hit.
pub const COGNITIVE: &str = "cognitive";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualiaCluster {
    #[serde(rename = "type")]
    pub modality: QualiaModality,
    pub count: usize,
    /// Share of all hits.
    pub intensity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualiaSignature {
    /// `None` when no modality was hit (reported as `"cognitive"`).
    pub dominant_type: Option<QualiaModality>,
    /// Raw hit counts in [`QualiaModality::ALL`] order.
    pub intensity_profile: [usize; QualiaModality::COUNT],
    pub discrimination_threshold: f64,
    pub saturation: f64,
    /// `(modality_index, share)` for modalities with at least one hit.
    pub invariant_patterns: Vec<(usize, f64)>,
    pub clusters: Vec<QualiaCluster>,
    /// First ten tokens: `[i / 10, flag per modality...]`.
    pub micro_variations: Vec<[f64; QualiaModality::COUNT + 1]>,
}

impl QualiaSignature {
    pub fn dominant_label(&self) -> &'static str {
        self.dominant_type.map(|m| m.as_str()).unwrap_or(COGNITIVE)
    }

    pub fn total_hits(&self) -> usize {
        self.intensity_profile.iter().sum()
    }
}

/// Build the qualia signature from the token set of the whole text.
pub fn build_qualia_signature(text: &str, lexicon: &Lexicon) -> QualiaSignature {
    let tokens = token_set(text);

    let mut profile = [0usize; QualiaModality::COUNT];
    for modality in QualiaModality::ALL {
        profile[modality.index()] = lexicon::hits(lexicon.modality_qualia(modality), &tokens);
    }
    let total: usize = profile.iter().sum();

    // Strict `>` keeps the first modality on ties.
    let mut dominant_type = None;
    let mut best = 0;
    for modality in QualiaModality::ALL {
        if profile[modality.index()] > best {
            best = profile[modality.index()];
            dominant_type = Some(modality);
        }
    }

    let share = |count: usize| count as f64 / total.max(1) as f64;

    let invariant_patterns = QualiaModality::ALL
        .iter()
        .filter(|m| profile[m.index()] > 0)
        .map(|m| (m.index(), share(profile[m.index()])))
        .collect();

    let clusters = QualiaModality::ALL
        .iter()
        .filter(|m| profile[m.index()] > 0)
        .map(|&m| QualiaCluster {
            modality: m,
            count: profile[m.index()],
            intensity: share(profile[m.index()]),
        })
        .collect();

    QualiaSignature {
        dominant_type,
        intensity_profile: profile,
        discrimination_threshold: JND_BASE + JND_STEP * total as f64,
        saturation: (total as f64 / SATURATION_HITS).min(1.0),
        invariant_patterns,
        clusters,
        micro_variations: micro_variations(text, lexicon),
    }
}

fn micro_variations(text: &str, lexicon: &Lexicon) -> Vec<[f64; QualiaModality::COUNT + 1]> {
    tokenize(text)
        .iter()
        .take(MICRO_VARIATION_TOKENS)
        .enumerate()
        .map(|(i, token)| {
            let mut row = [0.0; QualiaModality::COUNT + 1];
            row[0] = i as f64 / MICRO_VARIATION_TOKENS as f64;
            for modality in QualiaModality::ALL {
                if lexicon::contains(lexicon.modality_qualia(modality), token) {
                    row[modality.index() + 1] = 1.0;
                }
            }
            row
        })
        .collect()
}
