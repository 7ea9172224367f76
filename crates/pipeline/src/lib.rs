pub mod config;
pub mod status;
pub mod store;

pub use config::PipelineConfig;
pub use status::{Stage, StatusRecord};
pub use store::{ArtifactKind, ArtifactStore};

use anyhow::Result;
use classify::{ClassificationResult, Contract};
use dashmap::DashMap;
use extract::{ExtractionResult, Extractor};
use ingest::{CatalogEntry, Document, Normalizer, Source, SourceFetcher};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Content prefix (in chars) handed to the classification oracle alongside
/// the untruncated title.
const CLASSIFY_CONTENT_CHARS: usize = 1000;

/// Totals reported at the end of every batch run. A run always completes;
/// per-document failures land in `failed` instead of aborting.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    pub new_documents: usize,
    pub duplicates_skipped: usize,
    pub items_dropped: usize,
    pub classified: usize,
    pub degraded: usize,
    pub incidents_found: usize,
    pub extracted: usize,
    pub failed: usize,
}

/// Drives the three stages over a document batch. Stage completion is
/// tracked by per-document status records, so every stage is idempotent and
/// a re-run only touches documents that have not reached the stage yet.
pub struct Pipeline {
    store: Arc<ArtifactStore>,
    contract: Arc<Contract>,
    extractor: Extractor,
    max_concurrent_oracle_calls: usize,
    seen: DashMap<String, ()>,
}

impl Pipeline {
    pub fn new(store: ArtifactStore, contract: Contract, config: &PipelineConfig) -> Self {
        Self {
            store: Arc::new(store),
            contract: Arc::new(contract),
            extractor: Extractor::default(),
            max_concurrent_oracle_calls: config.concurrency.max_concurrent_oracle_calls.max(1),
            seen: DashMap::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Full batch run: normalize → classify → extract.
    pub async fn run(
        &self,
        sources: &[Source],
        fetcher: &dyn SourceFetcher,
        normalizer: &Normalizer<'_>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        self.normalize_stage(sources, fetcher, normalizer, &mut summary).await?;
        self.classify_stage(&mut summary).await?;
        self.extract_stage(&mut summary)?;
        info!(
            new = summary.new_documents,
            duplicates = summary.duplicates_skipped,
            incidents = summary.incidents_found,
            degraded = summary.degraded,
            failed = summary.failed,
            "batch run complete"
        );
        Ok(summary)
    }

    /// Stage 1: fetch raw items and normalize the survivors into Documents.
    /// A doc_id that already has a status record is a duplicate and is
    /// skipped without touching its artifacts.
    pub async fn normalize_stage(
        &self,
        sources: &[Source],
        fetcher: &dyn SourceFetcher,
        normalizer: &Normalizer<'_>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        for source in sources {
            let items = match fetcher.fetch(source).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(source_id = %source.source_id, error = %e, "source fetch failed, continuing");
                    continue;
                }
            };
            info!(source_id = %source.source_id, items = items.len(), fetcher = fetcher.name(), "fetched");

            for item in &items {
                let Some(doc) = normalizer.normalize_item(source, item).await else {
                    summary.items_dropped += 1;
                    continue;
                };
                if self.seen.contains_key(&doc.doc_id) || self.store.status_exists(&doc.doc_id) {
                    summary.duplicates_skipped += 1;
                    continue;
                }
                self.seen.insert(doc.doc_id.clone(), ());

                self.store.write_artifact(ArtifactKind::Document, &doc.doc_id, &doc)?;
                self.store.append_catalog(&CatalogEntry::from_document(&doc))?;
                self.store.write_status(&doc.doc_id, Stage::Normalized)?;
                summary.new_documents += 1;
            }
        }
        Ok(())
    }

    /// Stage 2: classify every document still at `Normalized`, with a
    /// bounded number of oracle calls in flight. Documents are independent,
    /// so completion order does not matter.
    pub async fn classify_stage(&self, summary: &mut RunSummary) -> Result<()> {
        let candidates: Vec<String> = self
            .store
            .list_statuses()?
            .into_iter()
            .filter(|r| r.stage == Stage::Normalized)
            .map(|r| r.doc_id)
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_oracle_calls));
        let mut tasks = JoinSet::new();
        for doc_id in candidates {
            let store = Arc::clone(&self.store);
            let contract = Arc::clone(&self.contract);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                classify_one(&store, &contract, &doc_id).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => {
                    summary.classified += 1;
                    if outcome.incident {
                        summary.incidents_found += 1;
                    }
                    if outcome.degraded {
                        summary.degraded += 1;
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "classification failed for one document");
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!(error = %e, "classification task panicked");
                    summary.failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Stage 3: resolve entities for classified incident documents.
    /// Non-incidents are gated out and never produce an ExtractionResult.
    pub fn extract_stage(&self, summary: &mut RunSummary) -> Result<()> {
        for record in self
            .store
            .list_statuses()?
            .into_iter()
            .filter(|r| r.stage == Stage::Classified)
        {
            let doc_id = &record.doc_id;
            let cls: ClassificationResult =
                match self.store.read_artifact(ArtifactKind::Classification, doc_id) {
                    Ok(cls) => cls,
                    Err(e) => {
                        warn!(doc_id, error = %e, "classification artifact missing, skipping");
                        continue;
                    }
                };
            if !cls.classification.is_incident {
                continue;
            }
            let doc: Document = match self.store.read_artifact(ArtifactKind::Document, doc_id) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(doc_id, error = %e, "document artifact missing, skipping");
                    continue;
                }
            };

            let reference = doc.published_at.date_naive();
            let mut fields = self.extractor.extract(&doc.title, &doc.content_text, reference);
            if fields.date.is_none() {
                // Date cascade fully missed: fall back to the date portion
                // of published_at.
                fields.date = Some(reference);
            }

            let result = ExtractionResult::new(doc_id.clone(), fields);
            self.store.write_artifact(ArtifactKind::Extraction, doc_id, &result)?;
            self.store.write_status(doc_id, Stage::Extracted)?;
            summary.extracted += 1;
        }
        Ok(())
    }
}

struct ClassifyOutcome {
    incident: bool,
    degraded: bool,
}

async fn classify_one(
    store: &ArtifactStore,
    contract: &Contract,
    doc_id: &str,
) -> Result<ClassifyOutcome> {
    let doc: Document = match store.read_artifact(ArtifactKind::Document, doc_id) {
        Ok(doc) => doc,
        Err(e) => {
            let _ = store.write_status(doc_id, Stage::Failed);
            return Err(e);
        }
    };

    let text = format!("{}\n{}", doc.title, prefix_chars(&doc.content_text, CLASSIFY_CONTENT_CHARS));
    let classification = contract.classify(&text).await;
    let outcome = ClassifyOutcome {
        incident: classification.is_incident,
        degraded: classification.is_degraded(),
    };

    let result = ClassificationResult {
        doc_id: doc.doc_id,
        url: doc.url,
        title: doc.title,
        published_at: doc.published_at,
        classification,
    };
    store.write_artifact(ArtifactKind::Classification, doc_id, &result)?;
    store.write_status(doc_id, Stage::Classified)?;
    Ok(outcome)
}

fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
