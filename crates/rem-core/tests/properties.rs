//! Property tests over arbitrary text: ranges, offsets, reproducibility
//! and schema parity hold for any input, including empty and
//! punctuation-only strings.

use std::sync::Arc;

use proptest::prelude::*;
use rem_core::{ExperientialRecord, Forge, ForgeConfig, HashingProvider, Language, normalize};
use serde_json::{Map, Value};

fn lexicon_forge() -> Forge {
    Forge::default()
}

fn provider_forge() -> Forge {
    Forge::with_provider(ForgeConfig::default(), Arc::new(HashingProvider::new(16).unwrap())).unwrap()
}

/// Words drawn from the lexicons mixed with noise, punctuation and
/// whitespace, so that scoring paths actually fire.
fn experiential_text() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("I".to_string()),
        Just("see".to_string()),
        Just("feel".to_string()),
        Just("red".to_string()),
        Just("bright".to_string()),
        Just("calm".to_string()),
        Just("think".to_string()),
        Just("remember".to_string()),
        Just("was".to_string()),
        Just("and".to_string()),
        Just("when".to_string()),
        Just("here".to_string()),
        Just("astonished".to_string()),
        Just("good".to_string()),
        Just(".".to_string()),
        Just("!".to_string()),
        "[a-zA-Z]{1,9}",
        "[ \t\n]{1,3}",
    ];
    prop::collection::vec(word, 0..40).prop_map(|parts| parts.join(" "))
}

fn unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

fn signed(v: f64) -> bool {
    (-1.0..=1.0).contains(&v)
}

fn check_ranges(record: &ExperientialRecord) -> Result<(), TestCaseError> {
    prop_assert!(record.validate().is_ok(), "{:?}", record.validate());
    for c in &record.experiential_stream.clause_boundaries {
        prop_assert!(unit(c.experiential_score));
    }
    for a in &record.semantic_contamination.lexical_anchors {
        prop_assert!(unit(a.interference_score));
    }
    prop_assert!(unit(record.phenomenal_core.qualia_signature.phenomenal_saturation));
    prop_assert!(signed(record.sensorial_layer.affective_valence));
    prop_assert!(signed(record.sensorial_layer.affective_arousal));
    let sum = record.sensorial_layer.modality_distribution.sum();
    prop_assert!((sum - 1.0).abs() < 1e-9, "distribution sums to {sum}");
    Ok(())
}

fn strip_identity(record: &ExperientialRecord) -> Value {
    let mut value = serde_json::to_value(record).unwrap();
    value["header"]["rem_id"] = Value::Null;
    value["header"]["timestamp_created"] = Value::Null;
    value
}

fn key_paths(value: &Value, prefix: &str, out: &mut Vec<String>) {
    if let Value::Object(map) = value {
        for (k, v) in map {
            let path = format!("{prefix}/{k}");
            out.push(path.clone());
            key_paths(v, &path, out);
        }
    }
}

proptest! {
    #[test]
    fn ranges_hold_for_any_text(text in any::<String>()) {
        check_ranges(&lexicon_forge().forge(&text, &Map::new()).unwrap())?;
    }

    #[test]
    fn ranges_hold_for_experiential_text(text in experiential_text()) {
        check_ranges(&lexicon_forge().forge(&text, &Map::new()).unwrap())?;
        check_ranges(&provider_forge().forge(&text, &Map::new()).unwrap())?;
    }

    #[test]
    fn clause_offsets_monotone_and_in_bounds(text in experiential_text()) {
        let record = lexicon_forge().forge(&text, &Map::new()).unwrap();
        let normalized: Vec<char> = record.experiential_stream.narrative_normalized.chars().collect();
        let mut prev = 0;
        for c in &record.experiential_stream.clause_boundaries {
            prop_assert!(c.start_offset >= prev);
            prop_assert!(c.start_offset <= c.end_offset);
            prop_assert!(c.end_offset <= normalized.len());
            let span: String = normalized[c.start_offset..c.end_offset].iter().collect();
            prop_assert_eq!(&span, &c.text);
            prev = c.start_offset;
        }
    }

    #[test]
    fn deterministic_apart_from_identity(text in experiential_text()) {
        let f = provider_forge();
        let a = f.forge(&text, &Map::new()).unwrap();
        let b = f.forge(&text, &Map::new()).unwrap();
        prop_assert_eq!(strip_identity(&a), strip_identity(&b));
    }

    #[test]
    fn strategies_share_key_paths(text in experiential_text()) {
        let a = serde_json::to_value(lexicon_forge().forge(&text, &Map::new()).unwrap()).unwrap();
        let b = serde_json::to_value(provider_forge().forge(&text, &Map::new()).unwrap()).unwrap();
        let (mut pa, mut pb) = (Vec::new(), Vec::new());
        key_paths(&a, "", &mut pa);
        key_paths(&b, "", &mut pb);
        pa.sort();
        pb.sort();
        prop_assert_eq!(pa, pb);
    }

    #[test]
    fn normalize_never_grows(text in any::<String>()) {
        let out = normalize(&text);
        prop_assert!(out.chars().count() <= text.chars().count());
        prop_assert_eq!(normalize(&out), out.clone());
    }

    #[test]
    fn spanish_ranges_hold(text in any::<String>()) {
        let config = ForgeConfig { language: Language::Spanish, ..ForgeConfig::default() };
        check_ranges(&Forge::new(config).unwrap().forge(&text, &Map::new()).unwrap())?;
    }
}
