use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed vocabulary of incident labels. Anything the oracle emits outside
/// this set is dropped by the sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Grounding,
    Collision,
    Fire,
    Piracy,
    Weather,
    PortClosure,
    Strike,
    Spill,
}

impl IncidentType {
    pub const ALL: [IncidentType; 8] = [
        IncidentType::Grounding,
        IncidentType::Collision,
        IncidentType::Fire,
        IncidentType::Piracy,
        IncidentType::Weather,
        IncidentType::PortClosure,
        IncidentType::Strike,
        IncidentType::Spill,
    ];

    /// Parse one vocabulary label; unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "grounding" => Some(Self::Grounding),
            "collision" => Some(Self::Collision),
            "fire" => Some(Self::Fire),
            "piracy" => Some(Self::Piracy),
            "weather" => Some(Self::Weather),
            "port_closure" => Some(Self::PortClosure),
            "strike" => Some(Self::Strike),
            "spill" => Some(Self::Spill),
            _ => None,
        }
    }
}

/// Sanitized judgment for one document. Only ever constructed by the
/// sanitizer or as the degraded placeholder, so its invariants hold:
/// `is_incident == false` implies no types, no near-miss, confidence ≤ 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub is_incident: bool,
    pub incident_types: Vec<IncidentType>,
    pub near_miss: bool,
    pub confidence: f64,
    pub rationale: String,
}

impl Classification {
    /// Conservative placeholder substituted when the oracle fails outright.
    /// Schema-indistinguishable from a genuine negative.
    pub fn degraded() -> Self {
        Self {
            is_incident: false,
            incident_types: Vec::new(),
            near_miss: false,
            confidence: 0.0,
            rationale: "error".to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        *self == Self::degraded()
    }
}

/// Persisted per-document classification artifact. Carries enough context
/// (url, title, published_at) for the downstream review collaborator to
/// render without re-joining the Document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub doc_id: String,
    pub url: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    #[serde(flatten)]
    pub classification: Classification,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_vocabulary() {
        for t in IncidentType::ALL {
            let label = serde_json::to_value(t).unwrap();
            assert_eq!(IncidentType::parse(label.as_str().unwrap()), Some(t));
        }
        assert_eq!(IncidentType::parse("tsunami"), None);
        assert_eq!(IncidentType::parse("Grounding"), None); // vocabulary is lowercase
    }

    #[test]
    fn degraded_shape() {
        let d = Classification::degraded();
        assert!(!d.is_incident);
        assert!(d.incident_types.is_empty());
        assert!(!d.near_miss);
        assert_eq!(d.confidence, 0.0);
        assert_eq!(d.rationale, "error");
        assert!(d.is_degraded());
    }

    #[test]
    fn result_serializes_flattened() {
        let r = ClassificationResult {
            doc_id: "sha256:abc".into(),
            url: "https://e.com".into(),
            title: "t".into(),
            published_at: Utc::now(),
            classification: Classification::degraded(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["doc_id"], "sha256:abc");
        assert_eq!(v["is_incident"], false);
        assert_eq!(v["rationale"], "error");
    }
}
