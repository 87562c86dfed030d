//! Named, versioned keyword tables consumed by every scoring stage.
//!
//! Stages never embed vocabulary of their own: they read it from a
//! [`Lexicon`], so a language variant can be swapped without touching the
//! scoring logic. Tables are plain data and are matched against lowercase
//! tokens produced by [`crate::tokenizer::tokenize`]; multi-word entries are
//! only meaningful in `connectives`, which the segmenter matches as a phrase.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::noetic::{Directedness, NoeticMode};
use crate::qualia::QualiaModality;

/// A table of lowercase keywords.
pub type Words = &'static [&'static str];

/// Language variant selecting a lexicon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::English),
            "es" | "spanish" | "español" => Some(Self::Spanish),
            _ => None,
        }
    }
}

/// Keyword tables for one language variant.
#[derive(Debug)]
pub struct Lexicon {
    pub language: Language,
    pub version: &'static str,

    // -- segmenter --
    pub connectives: Words,
    pub presence_markers: Words,
    pub sensory_qualities: Words,

    // -- anchors --
    pub stop_words: Words,
    pub pure_qualia: Words,
    pub contamination_markers: Words,

    // -- noetic --
    /// Indexed by [`NoeticMode::index`].
    pub mode_markers: [Words; NoeticMode::COUNT],
    /// Indexed in [`Directedness::PRIORITY`] order.
    pub directedness_cues: [Words; 5],
    pub first_person: Words,
    pub third_person: Words,
    pub past_markers: Words,
    pub present_markers: Words,
    pub retention_markers: Words,
    pub protention_markers: Words,
    pub now_markers: Words,

    // -- qualia --
    /// Indexed by [`QualiaModality::index`].
    pub modality_qualia: [Words; QualiaModality::COUNT],
    pub momentary_qualia: Words,

    // -- affect --
    pub semantic_affect: Words,
    pub phenomenal_affect: Words,

    // -- record tags --
    pub temporal_present: Words,
    pub temporal_past: Words,
    pub temporal_future: Words,
    pub temporal_atemporal: Words,
    pub temporal_habitual: Words,
    pub horizon_inner: Words,
    pub horizon_outer: Words,
    pub horizon_bodily: Words,
    pub horizon_spatial: Words,
    pub horizon_temporal: Words,
    pub near_locatives: Words,
    pub far_locatives: Words,
    pub inner_locatives: Words,
    pub chromatic_cues: Words,
    pub auditory_cues: Words,
    pub mnemonic_cues: Words,
    pub visual_inspection: Words,
    pub haptic_exploration: Words,
    pub auditory_attention: Words,
    pub reflective_contemplation: Words,
    pub noun_suffixes: Words,
    pub adjective_suffixes: Words,
    pub verb_suffixes: Words,
}

impl Lexicon {
    /// The lexicon for a language variant.
    pub fn for_language(language: Language) -> &'static Lexicon {
        match language {
            Language::English => &ENGLISH,
            Language::Spanish => &SPANISH,
        }
    }

    /// `<lang>-<version>`, stamped into record headers.
    pub fn tag(&self) -> String {
        format!("{}-{}", self.language.as_str(), self.version)
    }

    pub fn mode_markers(&self, mode: NoeticMode) -> Words {
        self.mode_markers[mode.index()]
    }

    pub fn modality_qualia(&self, modality: QualiaModality) -> Words {
        self.modality_qualia[modality.index()]
    }

    pub fn directedness_cues(&self, target: Directedness) -> Words {
        Directedness::PRIORITY
            .iter()
            .position(|d| *d == target)
            .map(|i| self.directedness_cues[i])
            .unwrap_or(&[])
    }
}

/// True if `token` appears in `words`.
pub fn contains(words: Words, token: &str) -> bool {
    words.contains(&token)
}

/// Number of distinct tokens in `tokens` that appear in `words`
/// (the size of the set intersection).
pub fn hits(words: Words, tokens: &HashSet<String>) -> usize {
    tokens.iter().filter(|t| contains(words, t)).count()
}

/// True if any token in `tokens` appears in `words`.
pub fn any_hit(words: Words, tokens: &HashSet<String>) -> bool {
    tokens.iter().any(|t| contains(words, t))
}

pub static ENGLISH: Lexicon = Lexicon {
    language: Language::English,
    version: "1.0",

    connectives: &[
        "and", "but", "when", "while", "however", "then", "although", "though", "whereas",
    ],
    presence_markers: &[
        "see", "sees", "hear", "hears", "feel", "feels", "smell", "smells", "taste", "tastes",
        "notice", "perceive", "observe", "watch", "sense", "me", "my", "here", "now", "facing",
        "under", "over", "inside", "within",
    ],
    sensory_qualities: &[
        "red", "blue", "green", "yellow", "white", "black", "bright", "dark", "clear", "luminous",
        "dim", "opaque", "glowing", "soft", "rough", "smooth", "coarse", "hard", "tender", "warm",
        "cold", "cool", "hot", "wet", "damp", "dry", "loud", "quiet", "muffled", "silent",
        "harmonious", "discordant", "sweet", "bitter", "sour", "salty", "spicy", "savory", "bland",
        "fragrant", "pungent", "acrid", "musty", "subtle", "intense", "sharp",
    ],

    stop_words: &[
        "the", "a", "an", "and", "or", "but", "of", "to", "in", "on", "at", "by", "for", "with",
        "from", "into", "onto", "about", "through", "like", "this", "that", "these", "those",
        "there", "their", "they", "them", "then", "than", "what", "when", "where", "which",
        "while", "who", "whom", "whose", "have", "has", "had", "been", "being", "were", "was",
        "are", "is", "will", "would", "could", "should", "just", "very", "also", "some", "such",
        "only", "over", "under", "after", "before", "again", "each", "more", "most", "other",
        "your", "yours", "mine", "myself", "itself", "it", "its", "my", "me", "i", "we", "our",
        "ours", "he", "she", "him", "her", "his", "hers", "not", "no", "so", "as", "if", "do",
        "does", "did",
    ],
    pure_qualia: &[
        "red", "blue", "green", "yellow", "white", "black", "gray", "grey", "bright", "dark",
        "clear", "opaque", "transparent", "solid", "soft", "rough", "smooth", "coarse", "hard",
        "tender", "warm", "cold", "loud", "quiet", "muffled", "silent",
    ],
    contamination_markers: &[
        "think", "thinks", "thought", "believe", "believes", "know", "knows", "understand",
        "understands", "remember", "remembers", "suppose", "guess", "probably", "perhaps", "maybe",
        "seems", "seem", "must", "therefore", "thus", "hence", "concept", "idea", "meaning",
        "purpose",
    ],

    mode_markers: [
        // perception
        &[
            "see", "sees", "hear", "hears", "feel", "feels", "perceive", "notice", "observe",
            "watch", "sense", "smell", "taste", "look", "listen",
        ],
        // memory
        &["remember", "remembered", "recall", "recalled", "was", "were", "had", "used", "once", "ago"],
        // imagination
        &["imagine", "imagined", "suppose", "perhaps", "maybe", "could", "would", "might", "dream"],
        // reflection
        &["think", "thought", "believe", "understand", "analyze", "consider", "reflect", "wonder", "realize"],
        // language
        &["say", "said", "tell", "told", "explain", "describe", "narrate", "write", "speak"],
        // action
        &["do", "make", "act", "try", "seek", "search", "want", "need", "grab", "walk", "reach"],
    ],
    directedness_cues: [
        // visual
        &["color", "colour", "red", "blue", "green", "yellow", "bright", "dark", "light", "see", "look", "glow"],
        // auditory
        &["sound", "hear", "noise", "voice", "music", "loud", "quiet", "listen"],
        // haptic
        &["feel", "texture", "smooth", "rough", "touch", "soft", "warm", "cold"],
        // gustatory
        &["taste", "flavor", "flavour", "sweet", "bitter", "sour", "salty"],
        // olfactory
        &["smell", "scent", "odor", "odour", "aroma", "fragrance"],
    ],
    first_person: &["i", "me", "my", "mine", "myself"],
    third_person: &["he", "she", "him", "his", "her", "hers", "they", "them", "their"],
    past_markers: &["was", "were", "had", "remembered", "used"],
    present_markers: &["see", "feel", "hear", "is", "am", "now", "notice"],
    retention_markers: &["remembered", "was", "were"],
    protention_markers: &["imagine", "would", "will"],
    now_markers: &["now"],

    modality_qualia: [
        // visual
        &["red", "blue", "green", "yellow", "bright", "dark", "clear", "luminous", "opaque", "glowing"],
        // auditory
        &["loud", "quiet", "muffled", "silent", "harmonious", "shrill", "booming", "resonant"],
        // haptic
        &["rough", "smooth", "soft", "hard", "tender", "warm", "cold", "damp", "wet"],
        // olfactory
        &["fragrant", "perfumed", "pungent", "acrid", "musty", "smoky"],
        // gustatory
        &["sweet", "bitter", "sour", "salty", "savory", "spicy", "umami"],
        // affective
        &["happy", "sad", "angry", "content", "anxious", "calm", "excited", "serene", "joyful"],
    ],
    momentary_qualia: &[
        "bright", "sudden", "intense", "vivid", "immediate", "pure", "direct", "instant", "clear",
        "precise",
    ],

    semantic_affect: &[
        "good", "bad", "great", "excellent", "terrible", "fantastic", "horrible", "awful", "nice",
        "like", "love", "hate", "detest", "prefer", "enjoy", "dislike",
    ],
    phenomenal_affect: &[
        "moved", "astonished", "transported", "amazed", "awed", "stunned", "thrilled",
        "fascinated", "mesmerized", "impressed", "surprised", "overwhelmed", "calm", "serene",
        "peaceful", "shaken",
    ],

    temporal_present: &["now", "see", "feel", "hear"],
    temporal_past: &["remembered", "was", "were", "had"],
    temporal_future: &["imagine", "would", "could", "will"],
    temporal_atemporal: &["always", "never", "eternal", "forever"],
    temporal_habitual: &["usually", "generally", "normally", "often"],
    horizon_inner: &["inside", "within", "interior", "inner"],
    horizon_outer: &["outside", "exterior", "world"],
    horizon_bodily: &["body", "hands", "skin", "fingers"],
    horizon_spatial: &["here", "there", "near", "far"],
    horizon_temporal: &["now", "before", "after", "time"],
    near_locatives: &["here", "near", "close", "nearby"],
    far_locatives: &["far", "distant", "yonder", "away"],
    inner_locatives: &["inside", "within"],
    chromatic_cues: &["color", "colour", "hue"],
    auditory_cues: &["sound", "hear"],
    mnemonic_cues: &["remember", "memory"],
    visual_inspection: &["see", "observe", "look", "watch"],
    haptic_exploration: &["feel", "perceive", "touch"],
    auditory_attention: &["listen", "hear"],
    reflective_contemplation: &["think", "reflect", "ponder"],
    noun_suffixes: &["tion", "ness", "ment", "ity"],
    adjective_suffixes: &["ous", "ful", "ive", "able", "al"],
    verb_suffixes: &["ing", "ed", "ize", "ise"],
};

pub static SPANISH: Lexicon = Lexicon {
    language: Language::Spanish,
    version: "1.0",

    connectives: &[
        "y", "pero", "entonces", "cuando", "mientras", "aunque", "sin embargo",
    ],
    presence_markers: &[
        "veo", "oigo", "siento", "huelo", "pruebo", "percibo", "noto", "observo", "está", "hay",
        "me", "mi", "aquí", "ahora", "ante", "frente", "bajo", "sobre", "dentro",
    ],
    sensory_qualities: &[
        "rojo", "azul", "verde", "brillante", "oscuro", "claro", "luminoso", "opaco", "suave",
        "áspero", "liso", "rugoso", "duro", "blando", "cálido", "frío", "húmedo", "seco", "alto",
        "fuerte", "sordo", "mudo", "armonioso", "discordante", "dulce", "amargo", "ácido",
        "salado", "umami", "picante", "sabroso", "insípido", "aromático", "perfumado",
        "penetrante", "sutil", "intenso",
    ],

    stop_words: &[
        "el", "la", "de", "que", "y", "a", "en", "un", "una", "es", "se", "con", "mi", "me",
        "te", "le", "lo", "las", "los", "del", "al", "por", "para", "sin", "sobre", "tras",
        "durante", "mediante",
    ],
    pure_qualia: &[
        "rojo", "azul", "verde", "amarillo", "blanco", "negro", "gris", "brillante", "oscuro",
        "claro", "opaco", "transparente", "sólido", "suave", "áspero", "liso", "rugoso", "duro",
        "blando", "cálido", "frío", "alto", "bajo", "fuerte", "sordo", "mudo",
    ],
    contamination_markers: &[
        "recuerda", "pienso", "creo", "entiendo", "parece", "probablemente", "quizás", "supongo",
        "debe",
    ],

    mode_markers: [
        &["veo", "oigo", "siento", "percibo", "noto", "observo"],
        &["recordé", "recuerdo", "era", "fue", "había", "solía"],
        &["imagino", "supongo", "quizás", "podría", "sería"],
        &["pienso", "creo", "entiendo", "analizo", "considero", "reflexiono"],
        &["digo", "cuento", "explico", "describo", "narro"],
        &["hago", "actúo", "intento", "busco", "quiero", "necesito"],
    ],
    directedness_cues: [
        &["color", "rojo", "azul"],
        &["sonido", "oigo", "ruido"],
        &["siento", "textura", "liso"],
        &["sabor", "dulce", "amargo"],
        &["olor", "huele"],
    ],
    first_person: &["yo", "me", "mi", "mis", "mí"],
    third_person: &["él", "ella", "su", "sus", "ellos", "ellas"],
    past_markers: &["era", "fue", "había"],
    present_markers: &["veo", "siento", "está"],
    retention_markers: &["recordé", "era"],
    protention_markers: &["imagino", "sería"],
    now_markers: &["ahora"],

    modality_qualia: [
        &["rojo", "azul", "verde", "brillante", "oscuro", "claro", "luminoso", "opaco"],
        &["alto", "bajo", "fuerte", "suave", "sordo", "claro", "mudo", "armonioso"],
        &["áspero", "liso", "suave", "duro", "blando", "cálido", "frío", "húmedo"],
        &["aromático", "perfumado", "ácido", "dulce", "amargo", "penetrante"],
        &["dulce", "amargo", "ácido", "salado", "umami", "picante", "sabroso"],
        &["feliz", "triste", "enojado", "contento", "ansioso", "tranquilo", "emocionado"],
    ],
    momentary_qualia: &[
        "brillante", "súbito", "intenso", "vivo", "inmediato", "puro", "directo", "instantáneo",
        "claro", "preciso",
    ],

    semantic_affect: &[
        "bien", "mal", "bueno", "malo", "excelente", "terrible", "fantástico", "horrible",
        "gusta", "encanta", "odio", "detesto", "prefiero", "disfruto",
    ],
    phenomenal_affect: &[
        "emocionado", "impresionado", "conmovido", "estremecido", "maravillado", "sorprendido",
        "asombrado", "fascinado", "hipnotizado", "transportado", "tranquilo", "sereno",
    ],

    temporal_present: &["ahora", "veo", "siento"],
    temporal_past: &["recordé", "era", "fue", "había"],
    temporal_future: &["imagino", "sería", "podría"],
    temporal_atemporal: &["siempre", "nunca", "eterno"],
    temporal_habitual: &["normalmente", "generalmente", "suelo"],
    horizon_inner: &["dentro", "adentro", "interior"],
    horizon_outer: &["afuera", "exterior", "mundo"],
    horizon_bodily: &["cuerpo", "manos", "piel", "dedos"],
    horizon_spatial: &["aquí", "ahí", "cerca", "lejos"],
    horizon_temporal: &["ahora", "antes", "después", "tiempo"],
    near_locatives: &["aquí", "cerca"],
    far_locatives: &["allá", "lejos"],
    inner_locatives: &["dentro"],
    chromatic_cues: &["color"],
    auditory_cues: &["sonido", "oigo"],
    mnemonic_cues: &["recuerdo", "memoria"],
    visual_inspection: &["veo", "observo"],
    haptic_exploration: &["siento", "percibo"],
    auditory_attention: &["escucho", "oigo"],
    reflective_contemplation: &["pienso", "reflexiono"],
    noun_suffixes: &["ción", "dad", "miento"],
    adjective_suffixes: &["oso", "osa", "ble", "ivo", "iva"],
    verb_suffixes: &["ar", "er", "ir"],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn disjoint(a: Words, b: Words) -> Vec<&'static str> {
        a.iter().filter(|w| b.contains(w)).copied().collect()
    }

    #[test]
    fn test_presence_and_sensory_disjoint() {
        for lex in [&ENGLISH, &SPANISH] {
            let overlap = disjoint(lex.presence_markers, lex.sensory_qualities);
            assert!(overlap.is_empty(), "{}: {overlap:?}", lex.tag());
        }
    }

    #[test]
    fn test_qualia_and_contamination_disjoint() {
        for lex in [&ENGLISH, &SPANISH] {
            let overlap = disjoint(lex.pure_qualia, lex.contamination_markers);
            assert!(overlap.is_empty(), "{}: {overlap:?}", lex.tag());
        }
    }

    #[test]
    fn test_affect_tables_disjoint() {
        for lex in [&ENGLISH, &SPANISH] {
            let overlap = disjoint(lex.semantic_affect, lex.phenomenal_affect);
            assert!(overlap.is_empty(), "{}: {overlap:?}", lex.tag());
        }
    }

    #[test]
    fn test_single_word_tables_are_lowercase() {
        for lex in [&ENGLISH, &SPANISH] {
            let tables: [Words; 6] = [
                lex.presence_markers,
                lex.sensory_qualities,
                lex.pure_qualia,
                lex.contamination_markers,
                lex.semantic_affect,
                lex.phenomenal_affect,
            ];
            for table in tables {
                for w in table {
                    assert_eq!(*w, w.to_lowercase());
                    assert!(!w.contains(' '), "multi-word entry {w:?} is unreachable");
                }
            }
        }
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("EN"), Some(Language::English));
        assert_eq!(Language::parse("spanish"), Some(Language::Spanish));
        assert_eq!(Language::parse("fr"), None);
    }

    #[test]
    fn test_tag_and_lookup() {
        let lex = Lexicon::for_language(Language::Spanish);
        assert_eq!(lex.tag(), "es-1.0");
        assert!(contains(lex.mode_markers(NoeticMode::Perception), "veo"));
        assert!(contains(lex.modality_qualia(QualiaModality::Gustatory), "salado"));
        assert!(contains(lex.directedness_cues(Directedness::Olfactory), "olor"));
        assert!(lex.directedness_cues(Directedness::General).is_empty());
    }

    #[test]
    fn test_hits_counts_distinct_tokens() {
        let tokens: HashSet<String> = ["red", "blue", "dog"].iter().map(|s| s.to_string()).collect();
        assert_eq!(hits(ENGLISH.pure_qualia, &tokens), 2);
        assert!(any_hit(ENGLISH.pure_qualia, &tokens));
        assert!(!any_hit(ENGLISH.contamination_markers, &tokens));
    }
}
