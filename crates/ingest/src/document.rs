use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized canonical record of one ingested article. Immutable once
/// created; every later stage is keyed by `doc_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub source_id: String,
    pub url: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    pub language: String,
    pub reliability: f64,
    pub content_text: String,
}

impl Document {
    /// Date portion of `published_at`, the last-resort fallback for the
    /// extraction stage's date cascade.
    pub fn published_date(&self) -> String {
        self.published_at.format("%Y-%m-%d").to_string()
    }
}

/// One line of the append-only catalog log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub doc_id: String,
    pub source_id: String,
    pub url: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

impl CatalogEntry {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            doc_id: doc.doc_id.clone(),
            source_id: doc.source_id.clone(),
            url: doc.url.clone(),
            title: doc.title.clone(),
            published_at: doc.published_at,
        }
    }
}
