use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::lexicon::{Language, Lexicon};
use crate::provider::HashingProvider;

/// Engineering tier. `Lite` never consults a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Full,
    Lite,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Full => "full",
            Tier::Lite => "lite",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub tier: Tier,
    pub language: Language,
    pub provider_anchor_limit: usize,
    pub lexicon_anchor_limit: usize,
    pub placeholder_dim: usize,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            tier: Tier::Full,
            language: Language::English,
            provider_anchor_limit: 5,
            lexicon_anchor_limit: 8,
            placeholder_dim: HashingProvider::DEFAULT_DIM,
        }
    }
}

impl ForgeConfig {
    pub fn lite() -> Self {
        Self {
            tier: Tier::Lite,
            ..Self::default()
        }
    }

    pub fn lexicon(&self) -> &'static Lexicon {
        Lexicon::for_language(self.language)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("provider_anchor_limit", self.provider_anchor_limit),
            ("lexicon_anchor_limit", self.lexicon_anchor_limit),
            ("placeholder_dim", self.placeholder_dim),
        ] {
            if value == 0 {
                return Err(ForgeError::Input(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = ForgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider_anchor_limit, 5);
        assert_eq!(config.lexicon_anchor_limit, 8);
        assert_eq!(config.lexicon().tag(), "en-1.0");
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = ForgeConfig {
            lexicon_anchor_limit: 0,
            ..ForgeConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lexicon_anchor_limit"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ForgeConfig =
            serde_json::from_str(r#"{"tier": "lite", "language": "es"}"#).unwrap();
        assert_eq!(config.tier, Tier::Lite);
        assert_eq!(config.language, Language::Spanish);
        assert_eq!(config.placeholder_dim, 64);
    }
}
