use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{EXPERIENTIAL_DIVISOR, PRESENCE_WEIGHT, SENSORY_WEIGHT};
use crate::lexicon::{self, Lexicon};
use crate::tokenizer::{token_set, word_count};

/// One experiential clause of the normalized text.
///
/// Offsets are character (Unicode scalar) positions into the normalized
/// text, half-open: `[start_offset, end_offset)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub length_in_words: usize,
    pub experiential_score: f64,
}

impl Clause {
    /// Lowercase token set of the clause text.
    pub fn tokens(&self) -> HashSet<String> {
        token_set(&self.text)
    }
}

/// Splits normalized text into ordered clauses.
///
/// Boundaries are sentence-final punctuation followed by whitespace (the
/// punctuation stays with the preceding clause) and the lexicon's
/// connectives surrounded by whitespace (the connective is dropped).
pub struct Segmenter<'a> {
    lexicon: &'a Lexicon,
    boundary: Regex,
}

impl<'a> Segmenter<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        let connectives = lexicon
            .connectives
            .iter()
            .map(|c| regex::escape(c).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = if connectives.is_empty() {
            r"([.!?]+)\s+".to_string()
        } else {
            format!(r"(?i)([.!?]+)\s+|\s+(?:{connectives})\s+")
        };
        let boundary = Regex::new(&pattern).expect("connective pattern is built from escaped words");
        Self { lexicon, boundary }
    }

    /// Split `text` into fragments in text order, trimmed, empties dropped.
    pub fn fragments<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut fragments = Vec::new();
        let mut last = 0;

        for caps in self.boundary.captures_iter(text) {
            let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((last, last));
            let end = match caps.get(1) {
                Some(punct) => punct.end(),
                None => whole.0,
            };
            let fragment = text[last..end].trim();
            if !fragment.is_empty() {
                fragments.push(fragment);
            }
            last = whole.1;
        }

        let remainder = text[last..].trim();
        if !remainder.is_empty() {
            fragments.push(remainder);
        }
        fragments
    }

    /// Segment `text` into scored clauses.
    ///
    /// Offsets come from a sequential search of each fragment starting at
    /// the end of the previous match, so repeated fragments map to distinct,
    /// increasing spans.
    pub fn segment(&self, text: &str) -> Vec<Clause> {
        let mut clauses = Vec::new();
        let mut cursor_byte = 0;
        let mut cursor_char = 0;

        for fragment in self.fragments(text) {
            let Some(rel) = text[cursor_byte..].find(fragment) else {
                continue;
            };
            let start_byte = cursor_byte + rel;
            let start_offset = cursor_char + text[cursor_byte..start_byte].chars().count();
            let end_offset = start_offset + fragment.chars().count();

            clauses.push(Clause {
                text: fragment.to_string(),
                start_offset,
                end_offset,
                length_in_words: word_count(fragment),
                experiential_score: self.score(fragment),
            });

            cursor_byte = start_byte + fragment.len();
            cursor_char = end_offset;
        }

        clauses
    }

    /// Experiential density of a clause in `[0, 1]`.
    pub fn score(&self, clause: &str) -> f64 {
        experiential_score(clause, self.lexicon)
    }
}

/// `(0.6 * presence hits + 0.4 * sensory hits) / 3`, clamped to 1.0.
pub fn experiential_score(clause: &str, lexicon: &Lexicon) -> f64 {
    let tokens = token_set(clause);
    let presence = lexicon::hits(lexicon.presence_markers, &tokens) as f64;
    let sensory = lexicon::hits(lexicon.sensory_qualities, &tokens) as f64;
    let raw = presence * PRESENCE_WEIGHT + sensory * SENSORY_WEIGHT;
    (raw / EXPERIENTIAL_DIVISOR).clamp(0.0, 1.0)
}

/// Segment with a one-off [`Segmenter`].
pub fn segment(text: &str, lexicon: &Lexicon) -> Vec<Clause> {
    Segmenter::new(lexicon).segment(text)
}
