use crate::sources::{RawItem, Source, SourceFetcher};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Fetcher that reads pre-fetched raw items from disk: one
/// `<source_id>.json` file per source holding a JSON array of items.
///
/// Network fetchers (feed readers, page scrapers) implement the same
/// `SourceFetcher` trait; this one covers offline runs and fixtures.
pub struct FileFetcher {
    dir: PathBuf,
}

impl FileFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SourceFetcher for FileFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawItem>> {
        let path = self.dir.join(format!("{}.json", source.source_id));
        let raw = fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read raw items: {}", path.display()))?;
        let items: Vec<RawItem> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid raw item file: {}", path.display()))?;
        Ok(items)
    }

    fn name(&self) -> &str {
        "file"
    }
}
