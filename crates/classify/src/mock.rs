use crate::oracle::{Oracle, OracleError};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Deterministic keyword oracle: the offline provider and the test double.
/// Pure function of its input, so classification runs are reproducible
/// without a hosted model.
pub struct KeywordOracle;

const KEYWORD_LABELS: &[(&str, &str)] = &[
    ("aground", "grounding"),
    ("grounding", "grounding"),
    ("collision", "collision"),
    ("collided", "collision"),
    ("allision", "collision"),
    ("fire", "fire"),
    ("blaze", "fire"),
    ("piracy", "piracy"),
    ("pirates", "piracy"),
    ("hijack", "piracy"),
    ("typhoon", "weather"),
    ("cyclone", "weather"),
    ("storm damage", "weather"),
    ("port closed", "port_closure"),
    ("port closure", "port_closure"),
    ("strike", "strike"),
    ("oil spill", "spill"),
    ("spill", "spill"),
];

const NEAR_MISS_CUES: &[&str] = &["averted", "prevented", "near miss", "narrowly avoided"];

#[async_trait]
impl Oracle for KeywordOracle {
    async fn classify_raw(&self, text: &str) -> Result<Value, OracleError> {
        let lower = text.to_lowercase();

        let mut types: Vec<&str> = Vec::new();
        for (keyword, label) in KEYWORD_LABELS {
            if lower.contains(keyword) && !types.contains(label) {
                types.push(*label);
            }
        }
        let is_incident = !types.is_empty();
        let near_miss = is_incident && NEAR_MISS_CUES.iter().any(|cue| lower.contains(cue));

        Ok(json!({
            "is_incident": is_incident,
            "incident_types": types,
            "near_miss": near_miss,
            "confidence": if is_incident { 0.9 } else { 0.2 },
            "rationale": if is_incident { "keyword match" } else { "no incident keywords" },
        }))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
