//! The forge: runs the stages in order and assembles one record.
//!
//! Normalizer → Segmenter → {Anchors, Noetic} → Qualia → Affect → Assembler.
//! A `Forge` is built once with its configuration and (optionally) a
//! provider, then shared; it holds no mutable state, so `forge` may run
//! concurrently on independent inputs.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock};

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::affect::split_affect;
use crate::anchor::{AnchorExtractor, AnchorSet, LexiconAnchors, ProviderAnchors};
use crate::assemble::{Assembler, StageOutputs};
use crate::clause::Segmenter;
use crate::config::{ForgeConfig, Tier};
use crate::error::{ForgeError, Result, Stage};
use crate::lexicon::Lexicon;
use crate::noetic::extract_noetic;
use crate::normalize::normalize;
use crate::provider::{EmbeddingProvider, ProviderError};
use crate::qualia::build_qualia_signature;
use crate::record::ExperientialRecord;

static DEFAULT_FORGE: LazyLock<Forge> = LazyLock::new(Forge::default);

/// Forge `text` with the default configuration and no provider.
pub fn forge(text: &str, context: &Map<String, Value>) -> Result<ExperientialRecord> {
    DEFAULT_FORGE.forge(text, context)
}

pub struct Forge {
    config: ForgeConfig,
    lexicon: &'static Lexicon,
    segmenter: Segmenter<'static>,
    /// `None` means lexicon mode for the lifetime of this forge.
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl Default for Forge {
    fn default() -> Self {
        Self::build(ForgeConfig::default(), None)
    }
}

impl Forge {
    /// Lexicon-only forge.
    pub fn new(config: ForgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, None))
    }

    /// Forge backed by `provider`. The lite tier ignores it.
    pub fn with_provider(config: ForgeConfig, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        config.validate()?;
        if config.tier == Tier::Lite {
            debug!(provider = provider.name(), "lite tier ignores provider");
            return Ok(Self::build(config, None));
        }
        Ok(Self::build(config, Some(provider)))
    }

    /// Run `init` once to obtain a provider. Failure is not fatal: the forge
    /// stays in lexicon mode and logs a degraded-mode notice.
    pub fn with_provider_init<F>(config: ForgeConfig, init: F) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<Arc<dyn EmbeddingProvider>, ProviderError>,
    {
        config.validate()?;
        if config.tier == Tier::Lite {
            return Ok(Self::build(config, None));
        }
        match init() {
            Ok(provider) => Ok(Self::build(config, Some(provider))),
            Err(e) => {
                warn!(error = %e, "provider unavailable, using lexicon anchors");
                Ok(Self::build(config, None))
            }
        }
    }

    fn build(config: ForgeConfig, provider: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        let lexicon = config.lexicon();
        Self {
            segmenter: Segmenter::new(lexicon),
            lexicon,
            config,
            provider,
        }
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &'static Lexicon {
        self.lexicon
    }

    /// Name of the active anchor strategy.
    pub fn anchor_strategy(&self) -> &str {
        match &self.provider {
            Some(p) => p.name(),
            None => "lexicon",
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Forge with a JSON context. `null` is treated as empty; any other
    /// non-object is rejected before a stage runs.
    pub fn forge_value(&self, text: &str, context: &Value) -> Result<ExperientialRecord> {
        match context {
            Value::Object(map) => self.forge(text, map),
            Value::Null => self.forge(text, &Map::new()),
            other => Err(ForgeError::Input(format!(
                "context must be a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Run every stage on `text`. Either returns a complete, validated
    /// record or an error naming the failed stage.
    pub fn forge(&self, text: &str, context: &Map<String, Value>) -> Result<ExperientialRecord> {
        let normalized = run_stage(Stage::Normalize, text, || normalize(text))?;
        let input = normalized.as_str();

        let clauses = run_stage(Stage::Segment, input, || self.segmenter.segment(input))?;
        let anchors = run_stage(Stage::Anchors, input, || self.extract_anchors(input))?;
        let noetic = run_stage(Stage::Noetic, input, || {
            extract_noetic(input, &clauses, self.lexicon)
        })?;
        let qualia = run_stage(Stage::Qualia, input, || {
            build_qualia_signature(input, self.lexicon)
        })?;
        let affect = run_stage(Stage::Affect, input, || {
            let mut split = split_affect(input, self.lexicon);
            split.sentiment_valence = self.sentiment(input);
            split
        })?;

        let parts = StageOutputs {
            raw: text,
            normalized: input,
            context,
            clauses: &clauses,
            anchors: &anchors,
            noetic: &noetic,
            qualia: &qualia,
            affect: &affect,
        };
        let assembler = Assembler::new(self.lexicon, self.config.tier);
        let record = run_stage(Stage::Assemble, input, || assembler.assemble(&parts))?;

        if let Err(violation) = record.validate() {
            error!(stage = %Stage::Assemble, %violation, "record failed validation");
            return Err(ForgeError::stage(Stage::Assemble, input, violation));
        }

        debug!(
            rem_id = %record.header.rem_id,
            clauses = clauses.len(),
            anchors = anchors.len(),
            strategy = self.anchor_strategy(),
            "record forged"
        );
        Ok(record)
    }

    fn lexicon_anchors(&self) -> LexiconAnchors<'static> {
        LexiconAnchors::new(
            self.lexicon,
            self.config.lexicon_anchor_limit,
            self.config.placeholder_dim,
        )
    }

    fn extract_anchors(&self, text: &str) -> AnchorSet {
        if let Some(provider) = &self.provider {
            let extractor =
                ProviderAnchors::new(provider.as_ref(), self.lexicon, self.config.provider_anchor_limit);
            match extractor.extract(text) {
                Ok(set) => return set,
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "embedding failed, using lexicon anchors");
                }
            }
        }
        // The lexicon strategy cannot fail.
        self.lexicon_anchors().extract(text).unwrap_or_default()
    }

    fn sentiment(&self, text: &str) -> Option<f64> {
        let provider = self.provider.as_ref()?;
        match provider.sentiment(text)? {
            Ok(sentiment) => Some(sentiment.signed_valence()),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "sentiment failed, using phenomenal valence");
                None
            }
        }
    }
}

/// Run one stage, turning a panic into a stage failure.
fn run_stage<T>(stage: Stage, input: &str, f: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "stage panicked".to_string());
        error!(stage = %stage, %message, "stage failed");
        ForgeError::stage(stage, input, message)
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
