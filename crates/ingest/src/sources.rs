use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where a source's items come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Feed,
    Page,
}

/// Descriptor for one upstream news source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub source_id: String,
    pub url: String,
    pub kind: SourceKind,
    #[serde(default)]
    pub reliability: Option<f64>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl Source {
    /// Reliability weight, defaulting to 0.7 when the source omits it.
    pub fn reliability_weight(&self) -> f64 {
        self.reliability.unwrap_or(0.7)
    }
}

/// One raw item yielded by a fetcher before normalization. `link` and
/// `title` are required downstream; items missing either are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub published: Option<String>,
}

/// Upstream fetch collaborator: yields raw items for a source. Feed parsing
/// and page scraping live behind this seam.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawItem>>;

    fn name(&self) -> &str {
        "unknown"
    }
}

/// Upstream page-to-text collaborator: best-effort article text for a URL,
/// empty string on failure. The normalizer falls back to the feed summary.
#[async_trait]
pub trait PageTextExtractor: Send + Sync {
    async fn extract_text(&self, url: &str) -> String;
}

/// Language detection collaborator, treated as a correct oracle.
pub trait LanguageDetector: Send + Sync {
    /// Guess the language of `text`; `None` means no confident guess.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Detector that never guesses, so the source default (or "en") always wins.
pub struct NoopLanguageDetector;

impl LanguageDetector for NoopLanguageDetector {
    fn detect(&self, _text: &str) -> Option<String> {
        None
    }
}

/// Extractor that never yields page text, forcing the summary fallback.
/// Useful for feed-only runs and tests.
pub struct NoopPageText;

#[async_trait]
impl PageTextExtractor for NoopPageText {
    async fn extract_text(&self, _url: &str) -> String {
        String::new()
    }
}
