use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Explicit per-document pipeline stage, recorded alongside the artifacts
/// and looked up by doc_id. Resumption keys off these records, never off
/// artifact presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Normalized,
    Classified,
    Extracted,
    Failed,
}

impl Stage {
    /// Pipeline progress order; `Failed` sits outside it.
    pub fn rank(self) -> Option<u8> {
        match self {
            Stage::Normalized => Some(1),
            Stage::Classified => Some(2),
            Stage::Extracted => Some(3),
            Stage::Failed => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub doc_id: String,
    pub stage: Stage,
    pub updated_at: DateTime<Utc>,
}

impl StatusRecord {
    pub fn new(doc_id: impl Into<String>, stage: Stage) -> Self {
        Self {
            doc_id: doc_id.into(),
            stage,
            updated_at: Utc::now(),
        }
    }
}
