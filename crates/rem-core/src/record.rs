//! The experiential record: the versioned, nested document a forge run emits.
//!
//! ```text
//! ExperientialRecord
//! ├── header                      id, versions, timestamp, quality metrics, context
//! ├── experiential_stream         raw/normalized text, clauses, temporal markers
//! ├── noetic_layer                intentional mode, directedness, ego, horizon
//! ├── sensorial_layer             modality distribution, valence, arousal
//! ├── semantic_contamination      anchors with salience, semantic traces
//! ├── phenomenal_core             invariant features, qualia signature, reductions
//! ├── multiscale_representation   coarse / medium / fine views
//! └── visualization_layer         clause coordinates, heatmap, temporal flow
//! ```
//!
//! Every block is owned by value. A record is never mutated after the
//! forge returns it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clause::Clause;
use crate::config::Tier;
use crate::constants::EPSILON;
use crate::noetic::{
    Directedness, InvariantVector, ModeShift, NoeticMode, PhaseTransition, TemporalVector,
};
use crate::qualia::{QualiaCluster, QualiaModality};

/// Top-level keys every serialized record carries.
pub const TOP_LEVEL_KEYS: [&str; 8] = [
    "header",
    "experiential_stream",
    "noetic_layer",
    "sensorial_layer",
    "semantic_contamination",
    "phenomenal_core",
    "multiscale_representation",
    "visualization_layer",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperientialRecord {
    pub header: Header,
    pub experiential_stream: ExperientialStream,
    pub noetic_layer: NoeticLayer,
    pub sensorial_layer: SensorialLayer,
    pub semantic_contamination: SemanticContamination,
    pub phenomenal_core: PhenomenalCore,
    pub multiscale_representation: MultiscaleRepresentation,
    pub visualization_layer: VisualizationLayer,
}

// --- header ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub rem_id: String,
    pub schema_version: String,
    pub forge_version: String,
    pub timestamp_created: String,
    pub modality_origin: String,
    pub tier: Tier,
    /// `<lang>-<version>` of the lexicon used.
    pub lexicon: String,
    pub temporal_scope: TemporalScope,
    pub quality_metrics: QualityMetrics,
    /// Caller context, verbatim.
    #[serde(default)]
    pub context: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemporalScope {
    pub start_offset: f64,
    pub duration: f64,
    pub total_sequence_length: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub completeness_score: f64,
    pub contamination_detected: bool,
    pub phenomenal_resolution: f64,
}

// --- experiential stream ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalMarker {
    Present,
    Past,
    Future,
    Atemporal,
    Habitual,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperientialStream {
    pub narrative_raw: String,
    pub narrative_normalized: String,
    pub narrative_enriched: String,
    pub clause_boundaries: Vec<Clause>,
    pub temporal_markers: Vec<TemporalMarker>,
}

// --- noetic layer ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizonType {
    Inner,
    Outer,
    Bodily,
    Spatial,
    Temporal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoeticLayer {
    pub intentional_mode: NoeticMode,
    pub directedness: Directedness,
    pub temporal_phase: TemporalMarker,
    pub ego_involvement: f64,
    pub horizon_type: HorizonType,
    pub act_intensity: f64,
}

// --- sensorial layer ---

/// Distribution over the nine experiential modalities; sums to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModalityDistribution {
    pub visual: f64,
    pub auditory: f64,
    pub haptic: f64,
    pub olfactory: f64,
    pub gustatory: f64,
    pub proprioceptive: f64,
    pub affective: f64,
    pub cognitive: f64,
    pub digital: f64,
}

impl ModalityDistribution {
    /// Prior before the dominant-type boost.
    pub fn prior() -> Self {
        Self {
            visual: 0.10,
            auditory: 0.05,
            haptic: 0.05,
            olfactory: 0.02,
            gustatory: 0.02,
            proprioceptive: 0.10,
            affective: 0.30,
            cognitive: 0.20,
            digital: 0.16,
        }
    }

    pub fn values(&self) -> [f64; 9] {
        [
            self.visual,
            self.auditory,
            self.haptic,
            self.olfactory,
            self.gustatory,
            self.proprioceptive,
            self.affective,
            self.cognitive,
            self.digital,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.values().iter().sum()
    }

    /// Slot for a qualia modality; `None` selects the cognitive slot.
    pub fn slot_mut(&mut self, modality: Option<QualiaModality>) -> &mut f64 {
        match modality {
            Some(QualiaModality::Visual) => &mut self.visual,
            Some(QualiaModality::Auditory) => &mut self.auditory,
            Some(QualiaModality::Haptic) => &mut self.haptic,
            Some(QualiaModality::Olfactory) => &mut self.olfactory,
            Some(QualiaModality::Gustatory) => &mut self.gustatory,
            Some(QualiaModality::Affective) => &mut self.affective,
            None => &mut self.cognitive,
        }
    }

    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= EPSILON {
            return Self::prior().normalized();
        }
        let [a, b, c, d, e, f, g, h, i] = self.values().map(|v| v / total);
        Self {
            visual: a,
            auditory: b,
            haptic: c,
            olfactory: d,
            gustatory: e,
            proprioceptive: f,
            affective: g,
            cognitive: h,
            digital: i,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialHorizon {
    PeripersonalSpace,
    ExtrapersonalSpace,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorialLayer {
    pub modality_distribution: ModalityDistribution,
    pub spatial_horizon: SpatialHorizon,
    pub affective_valence: f64,
    pub affective_arousal: f64,
}

// --- semantic contamination ---

/// Marker for a metric that is not computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MetricStatus {
    #[default]
    Unimplemented,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorEntry {
    pub token: String,
    pub embedding: Option<Vec<f32>>,
    pub interference_score: f64,
    /// `1 - interference_score`.
    pub salience_score: f64,
    pub temporal_position: usize,
    pub origin: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    Noun,
    Adjective,
    Verb,
}

impl TraceType {
    pub fn interference(&self) -> f64 {
        match self {
            TraceType::Noun => 0.3,
            TraceType::Adjective => 0.2,
            TraceType::Verb => 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemanticTrace {
    pub trace_type: TraceType,
    pub surface_form: String,
    pub phenomenal_interference: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemanticContamination {
    pub contamination_strength: f64,
    pub source: String,
    pub lexical_anchors: Vec<AnchorEntry>,
    pub semantic_traces: Vec<SemanticTrace>,
    pub invariance_under_semantic_permutation: MetricStatus,
}

// --- phenomenal core ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvariantFeatures {
    pub sensory_invariants: Vec<(usize, f64)>,
    pub noetic_invariants: Vec<InvariantVector>,
    /// `[position, score, present_marker, length]`, first three clauses.
    pub temporal_invariants: Vec<[f64; 4]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualiaBlock {
    /// Dominant modality name, or `"cognitive"`.
    pub qualia_type: String,
    pub intensity_profile: [usize; QualiaModality::COUNT],
    pub discrimination_threshold: f64,
    pub phenomenal_saturation: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionType {
    ColorReduction,
    SpatialReduction,
    TemporalReduction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EideticReduction {
    pub reduction_type: ReductionType,
    pub reduced_form: String,
    pub dependent_variations: Vec<String>,
}

impl EideticReduction {
    pub fn of(reduction_type: ReductionType) -> Self {
        let (form, variations): (&str, [&str; 3]) = match reduction_type {
            ReductionType::ColorReduction => (
                "extension with chromatic quality",
                ["hue", "saturation", "brightness"],
            ),
            ReductionType::SpatialReduction => {
                ("immediate presence", ["distance", "orientation", "size"])
            }
            ReductionType::TemporalReduction => ("living present", ["duration", "order", "rhythm"]),
        };
        Self {
            reduction_type,
            reduced_form: form.to_string(),
            dependent_variations: variations.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhenomenalCore {
    pub invariant_features: InvariantFeatures,
    pub qualia_signature: QualiaBlock,
    pub eidetic_reductions: Vec<EideticReduction>,
}

// --- multiscale ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoarseScale {
    pub global_narrative: String,
    pub thematic_gist: String,
    pub affective_gist: String,
    pub spatial_gist: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediumScale {
    /// Clauses scoring above the episodic cutoff.
    pub episodic_units: Vec<String>,
    pub intentional_shifts: Vec<ModeShift>,
    pub qualia_clusters: Vec<QualiaCluster>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MicroIntent {
    VisualInspection,
    HapticExploration,
    AuditoryAttention,
    ReflectiveContemplation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FineScale {
    pub momentary_experiences: Vec<String>,
    pub micro_intentionalities: Vec<MicroIntent>,
    pub qualia_micro_variations: Vec<[f64; QualiaModality::COUNT + 1]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiscaleRepresentation {
    pub coarse_scale: CoarseScale,
    pub medium_scale: MediumScale,
    pub fine_scale: FineScale,
}

// --- visualization ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceMap {
    pub format: String,
    /// `[i / n, score, 0]` per clause.
    pub coordinates: Vec<[f64; 3]>,
    pub qualia_weights: Vec<f64>,
    pub intentional_vectors: Vec<InvariantVector>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContaminationHeatmap {
    pub anchor_positions: Vec<usize>,
    pub contamination_density: Vec<f64>,
    /// `[i / n, score]` for clauses above the pure-zone cutoff.
    pub pure_zones: Vec<[f64; 2]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Continuous,
    Discrete,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemporalFlow {
    pub flow_type: FlowType,
    pub phase_transitions: Vec<PhaseTransition>,
    pub retention_protentions: Vec<TemporalVector>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualizationLayer {
    pub experience_map: ExperienceMap,
    pub contamination_heatmap: ContaminationHeatmap,
    pub temporal_flow: TemporalFlow,
}

// --- validation ---

impl ExperientialRecord {
    pub fn rem_id(&self) -> &str {
        &self.header.rem_id
    }

    /// Check the documented ranges and structural invariants.
    /// Returns a description of the first violation.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.header.rem_id.is_empty() {
            return Err("header.rem_id is empty".into());
        }
        if self.header.schema_version.is_empty() {
            return Err("header.schema_version is empty".into());
        }

        let text_len = self.experiential_stream.narrative_normalized.chars().count();
        let mut prev_start = 0;
        for (i, c) in self.experiential_stream.clause_boundaries.iter().enumerate() {
            if c.start_offset < prev_start || c.start_offset > c.end_offset || c.end_offset > text_len {
                return Err(format!(
                    "clause {i} span [{}, {}) out of order or outside text of length {text_len}",
                    c.start_offset, c.end_offset
                ));
            }
            prev_start = c.start_offset;
            unit("clause experiential_score", c.experiential_score)?;
        }

        for a in &self.semantic_contamination.lexical_anchors {
            unit("anchor interference_score", a.interference_score)?;
            unit("anchor salience_score", a.salience_score)?;
        }
        unit(
            "contamination_strength",
            self.semantic_contamination.contamination_strength,
        )?;
        unit(
            "phenomenal_saturation",
            self.phenomenal_core.qualia_signature.phenomenal_saturation,
        )?;
        unit("completeness_score", self.header.quality_metrics.completeness_score)?;
        unit("ego_involvement", self.noetic_layer.ego_involvement)?;
        unit("act_intensity", self.noetic_layer.act_intensity)?;
        signed_unit("affective_valence", self.sensorial_layer.affective_valence)?;
        signed_unit("affective_arousal", self.sensorial_layer.affective_arousal)?;

        let resolution = self.header.quality_metrics.phenomenal_resolution;
        if !(0.0..=crate::constants::MAX_RESOLUTION).contains(&resolution) {
            return Err(format!("phenomenal_resolution {resolution} out of range"));
        }

        let dist = &self.sensorial_layer.modality_distribution;
        if dist.values().iter().any(|v| !(0.0..=1.0).contains(v)) || (dist.sum() - 1.0).abs() > 1e-6 {
            return Err(format!("modality_distribution sums to {}", dist.sum()));
        }
        Ok(())
    }
}

fn unit(name: &str, v: f64) -> std::result::Result<(), String> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(format!("{name} {v} outside [0, 1]"))
    }
}

fn signed_unit(name: &str, v: f64) -> std::result::Result<(), String> {
    if (-1.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(format!("{name} {v} outside [-1, 1]"))
    }
}
