//! JSON interchange for experiential records.
//!
//! Records are exported as pretty JSON. Import accepts any record whose
//! schema major version matches the current one.

use crate::constants::SCHEMA_VERSION;
use crate::record::ExperientialRecord;

pub const CURRENT_VERSION: &str = SCHEMA_VERSION;

/// True if `version` (`<name>-<major>.<minor>.<patch>`) shares the current
/// major version.
pub fn is_compatible(version: &str) -> bool {
    match (major_version(version), major_version(CURRENT_VERSION)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn major_version(version: &str) -> Option<(&str, u32)> {
    let (name, numbers) = version.rsplit_once('-')?;
    let major = numbers.split('.').next()?.parse().ok()?;
    Some((name, major))
}

pub fn export_json(record: &ExperientialRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

/// Parse a record, rejecting incompatible schema versions.
pub fn import_json(json: &str) -> Result<ExperientialRecord, serde_json::Error> {
    let record: ExperientialRecord = serde_json::from_str(json)?;
    if !is_compatible(&record.header.schema_version) {
        return Err(serde::de::Error::custom(format!(
            "incompatible schema version {} (expected {CURRENT_VERSION})",
            record.header.schema_version
        )));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::forge;
    use crate::record::TOP_LEVEL_KEYS;
    use serde_json::Map;

    #[test]
    fn test_compatibility() {
        assert!(is_compatible("PhenomenalREM-2.0.0"));
        assert!(is_compatible("PhenomenalREM-2.7.1"));
        assert!(!is_compatible("PhenomenalREM-1.9.0"));
        assert!(!is_compatible("OtherSchema-2.0.0"));
        assert!(!is_compatible("garbage"));
    }

    #[test]
    fn test_roundtrip() {
        let record = forge("I see a bright red light. I feel calm.", &Map::new()).unwrap();
        let json = export_json(&record).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back.header.rem_id, record.header.rem_id);
        assert_eq!(back.header.timestamp_created, record.header.timestamp_created);
        assert_eq!(back.noetic_layer.intentional_mode, record.noetic_layer.intentional_mode);
        assert_eq!(
            back.semantic_contamination
                .lexical_anchors
                .iter()
                .map(|a| a.token.as_str())
                .collect::<Vec<_>>(),
            vec!["bright", "light", "feel", "calm"]
        );
        let texts: Vec<_> = back
            .experiential_stream
            .clause_boundaries
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, vec!["I see a bright red light.", "I feel calm."]);
    }

    #[test]
    fn test_export_has_top_level_keys() {
        let record = forge("", &Map::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&export_json(&record).unwrap()).unwrap();
        for key in TOP_LEVEL_KEYS {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(
            value["semantic_contamination"]["invariance_under_semantic_permutation"]["status"],
            "unimplemented"
        );
    }

    #[test]
    fn test_rejects_other_major() {
        let mut record = forge("calm", &Map::new()).unwrap();
        record.header.schema_version = "PhenomenalREM-3.0.0".into();
        let json = export_json(&record).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("incompatible schema version"));
    }
}
