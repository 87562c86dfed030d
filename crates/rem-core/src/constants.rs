/// Schema family + version stamped into every record header.
pub const SCHEMA_VERSION: &str = "PhenomenalREM-2.0.0";

/// Weight of a presence/perception marker in a clause's experiential score.
pub const PRESENCE_WEIGHT: f64 = 0.6;

/// Weight of a sensory-quality word in a clause's experiential score.
pub const SENSORY_WEIGHT: f64 = 0.4;

/// Divisor applied to the weighted hit sum before clamping to 1.0.
pub const EXPERIENTIAL_DIVISOR: f64 = 3.0;

/// Interference of a pure qualia word (color, texture, temperature).
pub const PURE_QUALIA_INTERFERENCE: f64 = 0.2;

/// Interference of an epistemic / conceptual marker.
pub const CONTAMINATION_INTERFERENCE: f64 = 0.8;

/// Interference of everything else.
pub const NEUTRAL_INTERFERENCE: f64 = 0.5;

/// Lexicon fallback keeps tokens strictly longer than this many chars.
pub const MIN_ANCHOR_CHARS: usize = 3;

/// Adjacent clauses whose scores differ by more than this are a mode shift.
pub const SHIFT_THRESHOLD: f64 = 0.3;

/// Per-clause invariant vectors are emitted for at most this many clauses.
pub const INVARIANT_CLAUSE_LIMIT: usize = 5;

/// Temporal vectors and temporal invariants cover at most this many clauses.
pub const TEMPORAL_CLAUSE_LIMIT: usize = 3;

/// Clause word count that normalizes to 1.0.
pub const CLAUSE_LENGTH_NORM: f64 = 20.0;

/// Base just-noticeable-difference threshold.
pub const JND_BASE: f64 = 0.1;

/// JND increment per qualia hit.
pub const JND_STEP: f64 = 0.05;

/// Qualia hit count at which phenomenal saturation reaches 1.0.
pub const SATURATION_HITS: f64 = 10.0;

/// Micro-variations are sampled from at most this many leading tokens.
pub const MICRO_VARIATION_TOKENS: usize = 10;

/// Clauses scoring above this become medium-scale episodic units.
pub const EPISODIC_CUTOFF: f64 = 0.6;

/// Clauses scoring above this are marked as pure zones.
pub const PURE_ZONE_CUTOFF: f64 = 0.7;

/// Upper bound on phenomenal resolution (bits).
pub const MAX_RESOLUTION: f64 = 10.0;

/// Normalized texts longer than this (chars) are considered complete.
pub const COMPLETENESS_MIN_CHARS: usize = 20;

/// Completeness score for short or empty input.
pub const LOW_COMPLETENESS: f64 = 0.7;

/// More anchors than this flags contamination in the quality metrics.
pub const CONTAMINATION_ANCHOR_COUNT: usize = 3;

/// Reading-rate estimate used for the temporal scope.
pub const CHARS_PER_SECOND: f64 = 10.0;

/// Prior mass added to the dominant qualia type before renormalizing.
pub const DOMINANT_BOOST: f64 = 0.3;

/// Averaged valence beyond +/- this is reported as positive / negative affect.
pub const AFFECT_GIST_THRESHOLD: f64 = 0.3;

/// Momentary experiences list is capped at this many tokens.
pub const MOMENTARY_LIMIT: usize = 5;

/// Semantic traces list is capped at this many entries.
pub const TRACE_LIMIT: usize = 10;

/// Characters of normalized input carried in a stage failure for reproduction.
pub const ERROR_EXCERPT_CHARS: usize = 120;

/// Tolerance for distribution sums and range checks.
pub const EPSILON: f64 = 1e-9;
