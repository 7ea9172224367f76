use crate::schema::{Classification, IncidentType};
use serde_json::Value;

const MAX_RATIONALE_CHARS: usize = 60;

/// Validate an untrusted oracle payload field by field into a
/// `Classification`. Never fails: missing fields, wrong types, and
/// out-of-vocabulary labels all coerce to conservative defaults.
///
/// Enforced invariant: a payload claiming `is_incident == false` cannot
/// smuggle in incident evidence — types are emptied, near_miss cleared, and
/// confidence capped at 0.5.
pub fn sanitize(raw: &Value) -> Classification {
    let is_incident = coerce_bool(raw.get("is_incident"));
    let near_miss = coerce_bool(raw.get("near_miss"));
    let confidence = coerce_confidence(raw.get("confidence"));
    let incident_types = coerce_types(raw.get("incident_types"));
    let rationale = truncate_chars(
        raw.get("rationale").and_then(Value::as_str).unwrap_or("").trim(),
        MAX_RATIONALE_CHARS,
    );

    let mut out = Classification {
        is_incident,
        incident_types,
        near_miss,
        confidence,
        rationale,
    };
    if !out.is_incident {
        out.incident_types.clear();
        out.near_miss = false;
        out.confidence = out.confidence.min(0.5);
    }
    out
}

/// Booleans arrive as real booleans or boolean-ish text ("true"/"1"/"yes",
/// any case). Everything else is false.
fn coerce_bool(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        }
        _ => false,
    }
}

/// Confidence as a float clamped into [0,1]; 0.5 when absent or invalid.
fn coerce_confidence(v: Option<&Value>) -> f64 {
    let parsed = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => 0.5,
    }
}

/// Keep only labels in the closed vocabulary, first occurrence wins,
/// unknown values dropped silently.
fn coerce_types(v: Option<&Value>) -> Vec<IncidentType> {
    let mut out = Vec::new();
    if let Some(Value::Array(items)) = v {
        for item in items {
            if let Some(t) = item.as_str().and_then(IncidentType::parse) {
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
    }
    out
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
