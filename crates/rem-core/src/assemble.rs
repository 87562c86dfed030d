//! Record assembly: selection, renormalization and nesting of stage
//! outputs. Adds no scoring of its own and never mutates its inputs.

use std::collections::HashSet;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::affect::AffectSplit;
use crate::anchor::AnchorSet;
use crate::clause::Clause;
use crate::config::Tier;
use crate::constants::{
    AFFECT_GIST_THRESHOLD, CHARS_PER_SECOND, COMPLETENESS_MIN_CHARS, CONTAMINATION_ANCHOR_COUNT,
    DOMINANT_BOOST, EPISODIC_CUTOFF, LOW_COMPLETENESS, MAX_RESOLUTION, MOMENTARY_LIMIT,
    NEUTRAL_INTERFERENCE, PURE_ZONE_CUTOFF, SCHEMA_VERSION, TEMPORAL_CLAUSE_LIMIT, TRACE_LIMIT,
};
use crate::lexicon::{self, Lexicon, Words};
use crate::noetic::{NoeticInvariantSet, length_norm};
use crate::qualia::{QualiaModality, QualiaSignature};
use crate::record::*;
use crate::time::now_iso8601;
use crate::tokenizer::{token_set, tokenize};

/// Everything the earlier stages produced for one input.
pub struct StageOutputs<'a> {
    pub raw: &'a str,
    pub normalized: &'a str,
    pub context: &'a Map<String, Value>,
    pub clauses: &'a [Clause],
    pub anchors: &'a AnchorSet,
    pub noetic: &'a NoeticInvariantSet,
    pub qualia: &'a QualiaSignature,
    pub affect: &'a AffectSplit,
}

pub struct Assembler<'a> {
    lexicon: &'a Lexicon,
    tier: Tier,
}

impl<'a> Assembler<'a> {
    pub fn new(lexicon: &'a Lexicon, tier: Tier) -> Self {
        Self { lexicon, tier }
    }

    /// Build a record with a fresh `rem_id` and creation timestamp.
    pub fn assemble(&self, parts: &StageOutputs<'_>) -> ExperientialRecord {
        self.assemble_with_identity(parts, new_rem_id(), now_iso8601())
    }

    pub fn assemble_with_identity(
        &self,
        parts: &StageOutputs<'_>,
        rem_id: String,
        timestamp_created: String,
    ) -> ExperientialRecord {
        let tokens = token_set(parts.normalized);
        let temporal_markers = self.temporal_markers(&tokens);

        ExperientialRecord {
            header: self.header(parts, rem_id, timestamp_created),
            experiential_stream: ExperientialStream {
                narrative_raw: parts.raw.to_string(),
                narrative_normalized: parts.normalized.to_string(),
                narrative_enriched: enriched_narrative(parts.normalized, parts.context),
                clause_boundaries: parts.clauses.to_vec(),
                temporal_markers: temporal_markers.clone(),
            },
            noetic_layer: NoeticLayer {
                intentional_mode: parts.noetic.dominant_mode,
                directedness: parts.noetic.directedness,
                temporal_phase: temporal_markers[0],
                ego_involvement: self.ego_involvement(parts.normalized),
                horizon_type: self.horizon_type(&tokens),
                act_intensity: act_intensity(parts.clauses),
            },
            sensorial_layer: SensorialLayer {
                modality_distribution: modality_distribution(parts.qualia),
                spatial_horizon: if lexicon::any_hit(self.lexicon.near_locatives, &tokens) {
                    SpatialHorizon::PeripersonalSpace
                } else {
                    SpatialHorizon::ExtrapersonalSpace
                },
                affective_valence: parts.affect.affective_valence().clamp(-1.0, 1.0),
                affective_arousal: parts.affect.arousal().clamp(-1.0, 1.0),
            },
            semantic_contamination: SemanticContamination {
                contamination_strength: parts
                    .anchors
                    .mean_interference()
                    .unwrap_or(NEUTRAL_INTERFERENCE),
                source: "text_phenomenological".to_string(),
                lexical_anchors: anchor_entries(parts.anchors),
                semantic_traces: self.semantic_traces(parts.normalized),
                invariance_under_semantic_permutation: MetricStatus::Unimplemented,
            },
            phenomenal_core: PhenomenalCore {
                invariant_features: InvariantFeatures {
                    sensory_invariants: parts.qualia.invariant_patterns.clone(),
                    noetic_invariants: parts.noetic.per_clause_vectors.clone(),
                    temporal_invariants: self.temporal_invariants(parts.clauses),
                },
                qualia_signature: QualiaBlock {
                    qualia_type: parts.qualia.dominant_label().to_string(),
                    intensity_profile: parts.qualia.intensity_profile,
                    discrimination_threshold: parts.qualia.discrimination_threshold,
                    phenomenal_saturation: parts.qualia.saturation,
                },
                eidetic_reductions: self.eidetic_reductions(&tokens, parts.qualia),
            },
            multiscale_representation: MultiscaleRepresentation {
                coarse_scale: CoarseScale {
                    global_narrative: global_narrative(parts.normalized),
                    thematic_gist: self.thematic_gist(&tokens).to_string(),
                    affective_gist: affective_gist(parts.affect).to_string(),
                    spatial_gist: self.spatial_gist(&tokens).to_string(),
                },
                medium_scale: MediumScale {
                    episodic_units: parts
                        .clauses
                        .iter()
                        .filter(|c| c.experiential_score > EPISODIC_CUTOFF)
                        .map(|c| c.text.clone())
                        .collect(),
                    intentional_shifts: parts.noetic.shifts.clone(),
                    qualia_clusters: parts.qualia.clusters.clone(),
                },
                fine_scale: FineScale {
                    momentary_experiences: self.momentary(parts.normalized),
                    micro_intentionalities: self.micro_intentionalities(parts.clauses),
                    qualia_micro_variations: parts.qualia.micro_variations.clone(),
                },
            },
            visualization_layer: visualization(parts),
        }
    }

    fn header(&self, parts: &StageOutputs<'_>, rem_id: String, timestamp_created: String) -> Header {
        let chars = parts.normalized.chars().count();
        let seconds = chars as f64 / CHARS_PER_SECOND;
        Header {
            rem_id,
            schema_version: SCHEMA_VERSION.to_string(),
            forge_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp_created,
            modality_origin: "text".to_string(),
            tier: self.tier,
            lexicon: self.lexicon.tag(),
            temporal_scope: TemporalScope {
                start_offset: 0.0,
                duration: seconds,
                total_sequence_length: seconds,
            },
            quality_metrics: QualityMetrics {
                completeness_score: if chars > COMPLETENESS_MIN_CHARS {
                    1.0
                } else {
                    LOW_COMPLETENESS
                },
                contamination_detected: parts.anchors.len() > CONTAMINATION_ANCHOR_COUNT,
                phenomenal_resolution: phenomenal_resolution(parts.anchors.len(), parts.clauses.len()),
            },
            context: parts.context.clone(),
        }
    }

    /// Tense/marker categories present, defaulting to present.
    fn temporal_markers(&self, tokens: &HashSet<String>) -> Vec<TemporalMarker> {
        let lex = self.lexicon;
        let table: [(Words, TemporalMarker); 5] = [
            (lex.temporal_present, TemporalMarker::Present),
            (lex.temporal_past, TemporalMarker::Past),
            (lex.temporal_future, TemporalMarker::Future),
            (lex.temporal_atemporal, TemporalMarker::Atemporal),
            (lex.temporal_habitual, TemporalMarker::Habitual),
        ];
        let markers: Vec<_> = table
            .into_iter()
            .filter(|(words, _)| lexicon::any_hit(words, tokens))
            .map(|(_, marker)| marker)
            .collect();
        if markers.is_empty() {
            vec![TemporalMarker::Present]
        } else {
            markers
        }
    }

    /// First-person share of personal-pronoun occurrences; 0.5 when none.
    fn ego_involvement(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let first = tokens
            .iter()
            .filter(|t| lexicon::contains(self.lexicon.first_person, t))
            .count();
        let third = tokens
            .iter()
            .filter(|t| lexicon::contains(self.lexicon.third_person, t))
            .count();
        if first + third == 0 {
            0.5
        } else {
            first as f64 / (first + third) as f64
        }
    }

    fn horizon_type(&self, tokens: &HashSet<String>) -> HorizonType {
        let lex = self.lexicon;
        [
            (lex.horizon_inner, HorizonType::Inner),
            (lex.horizon_outer, HorizonType::Outer),
            (lex.horizon_bodily, HorizonType::Bodily),
            (lex.horizon_spatial, HorizonType::Spatial),
            (lex.horizon_temporal, HorizonType::Temporal),
        ]
        .into_iter()
        .find(|(words, _)| lexicon::any_hit(words, tokens))
        .map(|(_, h)| h)
        .unwrap_or(HorizonType::Spatial)
    }

    /// Suffix heuristic over whitespace words, first match of noun,
    /// adjective, verb.
    fn semantic_traces(&self, text: &str) -> Vec<SemanticTrace> {
        let lex = self.lexicon;
        text.split_whitespace()
            .filter_map(|word| {
                let surface = word.trim_matches(|c: char| !c.is_alphanumeric());
                let lower = surface.to_lowercase();
                let ends = |suffixes: Words| suffixes.iter().any(|s| lower.ends_with(s));
                let trace_type = if ends(lex.noun_suffixes) {
                    TraceType::Noun
                } else if ends(lex.adjective_suffixes) {
                    TraceType::Adjective
                } else if ends(lex.verb_suffixes) {
                    TraceType::Verb
                } else {
                    return None;
                };
                Some(SemanticTrace {
                    trace_type,
                    surface_form: surface.to_string(),
                    phenomenal_interference: trace_type.interference(),
                })
            })
            .take(TRACE_LIMIT)
            .collect()
    }

    fn temporal_invariants(&self, clauses: &[Clause]) -> Vec<[f64; 4]> {
        let n = clauses.len().max(1) as f64;
        clauses
            .iter()
            .take(TEMPORAL_CLAUSE_LIMIT)
            .enumerate()
            .map(|(i, c)| {
                let now = lexicon::any_hit(self.lexicon.now_markers, &c.tokens());
                [
                    i as f64 / n,
                    c.experiential_score,
                    if now { 1.0 } else { 0.0 },
                    length_norm(c.length_in_words),
                ]
            })
            .collect()
    }

    fn eidetic_reductions(&self, tokens: &HashSet<String>, qualia: &QualiaSignature) -> Vec<EideticReduction> {
        let mut reductions = Vec::new();
        if qualia.dominant_type == Some(QualiaModality::Visual) {
            reductions.push(EideticReduction::of(ReductionType::ColorReduction));
        }
        if lexicon::any_hit(self.lexicon.near_locatives, tokens) {
            reductions.push(EideticReduction::of(ReductionType::SpatialReduction));
        }
        reductions.push(EideticReduction::of(ReductionType::TemporalReduction));
        reductions
    }

    fn thematic_gist(&self, tokens: &HashSet<String>) -> &'static str {
        let lex = self.lexicon;
        if lexicon::any_hit(lex.chromatic_cues, tokens) {
            "chromatic visual experience"
        } else if lexicon::any_hit(lex.auditory_cues, tokens) {
            "auditory experience"
        } else if lexicon::any_hit(lex.mnemonic_cues, tokens) {
            "mnemonic experience"
        } else {
            "general sensory experience"
        }
    }

    fn spatial_gist(&self, tokens: &HashSet<String>) -> &'static str {
        let lex = self.lexicon;
        if lexicon::any_hit(lex.near_locatives, tokens) {
            "peripersonal space"
        } else if lexicon::any_hit(lex.far_locatives, tokens) {
            "extrapersonal space"
        } else if lexicon::any_hit(lex.inner_locatives, tokens) {
            "inner space"
        } else {
            "indeterminate space"
        }
    }

    /// Momentary-quality tokens in text order, at most five.
    fn momentary(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|t| lexicon::contains(self.lexicon.momentary_qualia, t))
            .take(MOMENTARY_LIMIT)
            .collect()
    }

    fn micro_intentionalities(&self, clauses: &[Clause]) -> Vec<MicroIntent> {
        let lex = self.lexicon;
        let table: [(Words, MicroIntent); 4] = [
            (lex.visual_inspection, MicroIntent::VisualInspection),
            (lex.haptic_exploration, MicroIntent::HapticExploration),
            (lex.auditory_attention, MicroIntent::AuditoryAttention),
            (lex.reflective_contemplation, MicroIntent::ReflectiveContemplation),
        ];
        clauses
            .iter()
            .take(TEMPORAL_CLAUSE_LIMIT)
            .filter_map(|c| {
                let tokens = c.tokens();
                table
                    .iter()
                    .find(|(words, _)| lexicon::any_hit(words, &tokens))
                    .map(|(_, intent)| *intent)
            })
            .collect()
    }
}

/// `TXT-` followed by a v4 UUID in simple form.
pub fn new_rem_id() -> String {
    format!("TXT-{}", Uuid::new_v4().simple())
}

/// `min(log2(anchors / clauses + 1) * 2, 10)`; zero when either count is zero.
pub fn phenomenal_resolution(anchors: usize, clauses: usize) -> f64 {
    if anchors == 0 || clauses == 0 {
        return 0.0;
    }
    let density = anchors as f64 / clauses as f64;
    ((density + 1.0).log2() * 2.0).min(MAX_RESOLUTION)
}

/// Prior distribution, boosted on the dominant qualia type, renormalized.
pub fn modality_distribution(qualia: &QualiaSignature) -> ModalityDistribution {
    let mut dist = ModalityDistribution::prior();
    *dist.slot_mut(qualia.dominant_type) += DOMINANT_BOOST;
    dist.normalized()
}

fn enriched_narrative(normalized: &str, context: &Map<String, Value>) -> String {
    let situation = match context.get("situational_context") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "none".to_string(),
        Some(other) => other.to_string(),
    };
    format!("[Context: {situation}] {normalized}")
}

fn act_intensity(clauses: &[Clause]) -> f64 {
    if clauses.is_empty() {
        return 0.5;
    }
    let sum: f64 = clauses.iter().map(|c| c.experiential_score).sum();
    (sum / clauses.len() as f64).clamp(0.0, 1.0)
}

fn anchor_entries(anchors: &AnchorSet) -> Vec<AnchorEntry> {
    anchors
        .anchors
        .iter()
        .map(|a| AnchorEntry {
            token: a.token.clone(),
            embedding: a.embedding.clone(),
            interference_score: a.interference_score,
            salience_score: a.salience(),
            temporal_position: a.temporal_position,
            origin: a.origin_tag.clone(),
        })
        .collect()
}

/// First sentence when the text has several, else the text (truncated to
/// 100 characters).
fn global_narrative(text: &str) -> String {
    let mut sentences = text.split('.');
    if let (Some(first), Some(_)) = (sentences.next(), sentences.next()) {
        return first.trim().to_string();
    }
    match text.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn affective_gist(affect: &AffectSplit) -> &'static str {
    let mean = affect.arousal();
    if mean > AFFECT_GIST_THRESHOLD {
        "positive affect"
    } else if mean < -AFFECT_GIST_THRESHOLD {
        "negative affect"
    } else {
        "neutral affect"
    }
}

fn visualization(parts: &StageOutputs<'_>) -> VisualizationLayer {
    let clauses = parts.clauses;
    let n = clauses.len().max(1) as f64;

    VisualizationLayer {
        experience_map: ExperienceMap {
            format: "graph_network".to_string(),
            coordinates: clauses
                .iter()
                .enumerate()
                .map(|(i, c)| [i as f64 / n, c.experiential_score, 0.0])
                .collect(),
            qualia_weights: clauses.iter().map(|c| c.experiential_score).collect(),
            intentional_vectors: parts.noetic.per_clause_vectors.clone(),
        },
        contamination_heatmap: ContaminationHeatmap {
            anchor_positions: (0..parts.anchors.len()).collect(),
            contamination_density: parts.anchors.interference_scores(),
            pure_zones: clauses
                .iter()
                .enumerate()
                .filter(|(_, c)| c.experiential_score > PURE_ZONE_CUTOFF)
                .map(|(i, c)| [i as f64 / n, c.experiential_score])
                .collect(),
        },
        temporal_flow: TemporalFlow {
            flow_type: if clauses.len() > 1 {
                FlowType::Continuous
            } else {
                FlowType::Discrete
            },
            phase_transitions: parts.noetic.phase_transitions.clone(),
            retention_protentions: parts.noetic.temporal_vectors.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affect::split_affect;
    use crate::anchor::{AnchorExtractor, LexiconAnchors};
    use crate::clause::segment;
    use crate::lexicon::ENGLISH;
    use crate::noetic::extract_noetic;
    use crate::qualia::build_qualia_signature;
    use approx::assert_relative_eq;

    fn assemble_text(text: &str, context: &Map<String, Value>) -> ExperientialRecord {
        let clauses = segment(text, &ENGLISH);
        let anchors = LexiconAnchors::new(&ENGLISH, 8, 4).extract(text).unwrap();
        let noetic = extract_noetic(text, &clauses, &ENGLISH);
        let qualia = build_qualia_signature(text, &ENGLISH);
        let affect = split_affect(text, &ENGLISH);
        let parts = StageOutputs {
            raw: text,
            normalized: text,
            context,
            clauses: &clauses,
            anchors: &anchors,
            noetic: &noetic,
            qualia: &qualia,
            affect: &affect,
        };
        Assembler::new(&ENGLISH, Tier::Full).assemble(&parts)
    }

    #[test]
    fn test_resolution() {
        assert_eq!(phenomenal_resolution(0, 3), 0.0);
        assert_eq!(phenomenal_resolution(3, 0), 0.0);
        assert_relative_eq!(phenomenal_resolution(1, 1), 2.0);
        assert_eq!(phenomenal_resolution(10_000, 1), MAX_RESOLUTION);
    }

    #[test]
    fn test_rem_id_shape() {
        let id = new_rem_id();
        assert!(id.starts_with("TXT-"));
        assert_eq!(id.len(), 4 + 32);
        assert_ne!(id, new_rem_id());
    }

    #[test]
    fn test_global_narrative() {
        assert_eq!(global_narrative("I see. I feel."), "I see");
        assert_eq!(global_narrative("no period"), "no period");
        let long = "x".repeat(150);
        assert_eq!(global_narrative(&long).chars().count(), 103);
    }

    #[test]
    fn test_enriched_narrative() {
        let mut ctx = Map::new();
        assert_eq!(enriched_narrative("hi", &ctx), "[Context: none] hi");
        ctx.insert("situational_context".into(), Value::String("garden".into()));
        assert_eq!(enriched_narrative("hi", &ctx), "[Context: garden] hi");
        ctx.insert("situational_context".into(), serde_json::json!(3));
        assert_eq!(enriched_narrative("hi", &ctx), "[Context: 3] hi");
    }

    #[test]
    fn test_scenario_record_fields() {
        let record = assemble_text("I see a bright red light. I feel calm.", &Map::new());
        assert!(record.validate().is_ok());
        assert_eq!(record.header.schema_version, SCHEMA_VERSION);
        assert_eq!(record.header.quality_metrics.completeness_score, 1.0);
        assert_eq!(record.experiential_stream.temporal_markers, vec![TemporalMarker::Present]);
        assert_eq!(record.noetic_layer.ego_involvement, 1.0);
        assert_eq!(record.phenomenal_core.qualia_signature.qualia_type, "visual");
        let reductions: Vec<_> = record
            .phenomenal_core
            .eidetic_reductions
            .iter()
            .map(|r| r.reduction_type)
            .collect();
        assert_eq!(
            reductions,
            vec![ReductionType::ColorReduction, ReductionType::TemporalReduction]
        );
        assert_eq!(
            record.multiscale_representation.fine_scale.micro_intentionalities,
            vec![MicroIntent::VisualInspection, MicroIntent::HapticExploration]
        );
        assert_eq!(
            record.multiscale_representation.fine_scale.momentary_experiences,
            vec!["bright"]
        );
        assert_eq!(record.visualization_layer.temporal_flow.flow_type, FlowType::Continuous);
    }

    #[test]
    fn test_empty_record() {
        let record = assemble_text("", &Map::new());
        assert!(record.validate().is_ok());
        assert_eq!(record.header.quality_metrics.completeness_score, LOW_COMPLETENESS);
        assert_eq!(record.header.quality_metrics.phenomenal_resolution, 0.0);
        assert_eq!(record.noetic_layer.act_intensity, 0.5);
        assert_eq!(record.noetic_layer.ego_involvement, 0.5);
        assert_eq!(record.semantic_contamination.contamination_strength, 0.5);
        assert_eq!(record.noetic_layer.horizon_type, HorizonType::Spatial);
        assert_eq!(record.visualization_layer.temporal_flow.flow_type, FlowType::Discrete);
        assert_eq!(record.multiscale_representation.coarse_scale.global_narrative, "");
    }

    #[test]
    fn test_temporal_markers_and_phase() {
        let record = assemble_text("It was always quiet.", &Map::new());
        assert_eq!(
            record.experiential_stream.temporal_markers,
            vec![TemporalMarker::Past, TemporalMarker::Atemporal]
        );
        assert_eq!(record.noetic_layer.temporal_phase, TemporalMarker::Past);
    }

    #[test]
    fn test_spatial_cues() {
        let record = assemble_text("The lamp is here near me.", &Map::new());
        assert_eq!(record.sensorial_layer.spatial_horizon, SpatialHorizon::PeripersonalSpace);
        assert_eq!(record.multiscale_representation.coarse_scale.spatial_gist, "peripersonal space");
        assert!(
            record
                .phenomenal_core
                .eidetic_reductions
                .iter()
                .any(|r| r.reduction_type == ReductionType::SpatialReduction)
        );
    }

    #[test]
    fn test_semantic_traces() {
        let record = assemble_text("Joyous motion, walking slowly.", &Map::new());
        let traces = &record.semantic_contamination.semantic_traces;
        let types: Vec<_> = traces.iter().map(|t| t.trace_type).collect();
        assert_eq!(types, vec![TraceType::Adjective, TraceType::Noun, TraceType::Verb]);
        assert_eq!(traces[1].surface_form, "motion");
    }

    #[test]
    fn test_ego_involvement_mixed() {
        let record = assemble_text("I watched her and she smiled at me.", &Map::new());
        // i, me vs her, she
        assert_relative_eq!(record.noetic_layer.ego_involvement, 0.5);
    }

    #[test]
    fn test_context_passes_through() {
        let mut ctx = Map::new();
        ctx.insert("author_id".into(), Value::String("a-17".into()));
        let record = assemble_text("calm", &ctx);
        assert_eq!(record.header.context["author_id"], "a-17");
    }

    #[test]
    fn test_inputs_untouched() {
        let text = "I see a light.";
        let clauses = segment(text, &ENGLISH);
        let before = clauses.clone();
        let anchors = LexiconAnchors::new(&ENGLISH, 8, 4).extract(text).unwrap();
        let noetic = extract_noetic(text, &clauses, &ENGLISH);
        let qualia = build_qualia_signature(text, &ENGLISH);
        let affect = split_affect(text, &ENGLISH);
        let ctx = Map::new();
        let parts = StageOutputs {
            raw: text,
            normalized: text,
            context: &ctx,
            clauses: &clauses,
            anchors: &anchors,
            noetic: &noetic,
            qualia: &qualia,
            affect: &affect,
        };
        let _ = Assembler::new(&ENGLISH, Tier::Lite).assemble(&parts);
        assert_eq!(clauses, before);
    }
}
