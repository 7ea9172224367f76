use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Structured fields resolved for one incident document. Every field may be
/// absent: a detector cascade that finds nothing is a miss, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub doc_id: String,
    pub vessel: Option<String>,
    pub imo: Option<String>,
    pub port: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Field bundle before it is keyed by doc_id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFields {
    pub vessel: Option<String>,
    pub imo: Option<String>,
    pub port: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExtractionResult {
    pub fn new(doc_id: impl Into<String>, fields: EntityFields) -> Self {
        Self {
            doc_id: doc_id.into(),
            vessel: fields.vessel,
            imo: fields.imo,
            port: fields.port,
            date: fields.date,
        }
    }
}
