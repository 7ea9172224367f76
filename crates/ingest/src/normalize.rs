use crate::document::Document;
use crate::filter::looks_maritime;
use crate::sources::{LanguageDetector, PageTextExtractor, RawItem, Source};
use crate::compute_doc_id;
use chrono::{DateTime, Utc};
use tracing::debug;

const LANG_SAMPLE_CHARS: usize = 5000;

/// Turns raw fetched items into canonical `Document`s.
///
/// Page-to-text and language detection are injected collaborators; the
/// normalizer itself only decides what survives and assigns identity.
pub struct Normalizer<'a> {
    page_text: &'a dyn PageTextExtractor,
    lang: &'a dyn LanguageDetector,
}

impl<'a> Normalizer<'a> {
    pub fn new(page_text: &'a dyn PageTextExtractor, lang: &'a dyn LanguageDetector) -> Self {
        Self { page_text, lang }
    }

    /// Normalize one raw item, or `None` if it is dropped: missing link or
    /// title, no text from any source, or not maritime-relevant.
    pub async fn normalize_item(&self, source: &Source, item: &RawItem) -> Option<Document> {
        let url = item.link.as_deref()?.trim();
        let title = item.title.as_deref().unwrap_or("").trim();
        if url.is_empty() || title.is_empty() {
            debug!(source_id = %source.source_id, "item dropped: missing link or title");
            return None;
        }

        // Full article text, falling back to the feed summary.
        let mut text = self.page_text.extract_text(url).await.trim().to_string();
        if text.is_empty() {
            text = item.summary.trim().to_string();
        }
        if text.is_empty() {
            debug!(source_id = %source.source_id, url, "item dropped: no text from any source");
            return None;
        }

        if !looks_maritime(&format!("{title}\n{text}")) {
            debug!(source_id = %source.source_id, url, "item dropped: not maritime");
            return None;
        }

        let fetched_at = Utc::now();
        let language = source
            .lang
            .clone()
            .or_else(|| self.lang.detect(crate::prefix_chars(&text, LANG_SAMPLE_CHARS)))
            .unwrap_or_else(|| "en".to_string());
        let published_at = parse_published(item.published.as_deref()).unwrap_or(fetched_at);

        Some(Document {
            doc_id: compute_doc_id(title, url, &text),
            source_id: source.source_id.clone(),
            url: url.to_string(),
            title: title.to_string(),
            published_at,
            fetched_at,
            language,
            reliability: source.reliability_weight(),
            content_text: text,
        })
    }
}

/// Feed timestamps arrive as RFC 3339 or RFC 2822; anything else falls back
/// to fetch time at the caller.
fn parse_published(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
