//! End-to-end tests for the three-stage pipeline: normalize → classify →
//! extract, over an in-memory fetcher and the deterministic keyword oracle.

use async_trait::async_trait;
use classify::{Contract, KeywordOracle, Oracle, OracleError, RetryPolicy};
use ingest::sources::{NoopLanguageDetector, NoopPageText};
use ingest::{Normalizer, RawItem, Source, SourceFetcher, SourceKind};
use pipeline::{ArtifactKind, ArtifactStore, Pipeline, PipelineConfig, Stage};
use std::sync::Arc;

struct StaticFetcher {
    items: Vec<RawItem>,
}

#[async_trait]
impl SourceFetcher for StaticFetcher {
    async fn fetch(&self, _source: &Source) -> anyhow::Result<Vec<RawItem>> {
        Ok(self.items.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Oracle that fails transiently on every attempt.
struct DownOracle;

#[async_trait]
impl Oracle for DownOracle {
    async fn classify_raw(&self, _text: &str) -> Result<serde_json::Value, OracleError> {
        Err(OracleError::Transient("connect refused".into()))
    }

    fn name(&self) -> &str {
        "down"
    }
}

fn item(link: &str, title: &str, summary: &str, published: Option<&str>) -> RawItem {
    RawItem {
        link: Some(link.to_string()),
        title: Some(title.to_string()),
        summary: summary.to_string(),
        published: published.map(String::from),
    }
}

fn test_source() -> Source {
    Source {
        source_id: "wire".into(),
        url: "https://example.com/feed".into(),
        kind: SourceKind::Feed,
        reliability: Some(0.8),
        lang: Some("en".into()),
    }
}

fn batch() -> Vec<RawItem> {
    vec![
        item(
            "https://example.com/grounding",
            "Port Hedland reports grounding of MV Example One",
            "The vessel IMO 1234567 ran aground near Port Hedland.",
            Some("2024-03-01T10:00:00Z"),
        ),
        item(
            "https://example.com/fees",
            "Container fees rise",
            "The port authority raised container handling fees for the quarter.",
            None,
        ),
        // Exact duplicate of the first item: same identity prefixes.
        item(
            "https://example.com/grounding",
            "Port Hedland reports grounding of MV Example One",
            "The vessel IMO 1234567 ran aground near Port Hedland.",
            Some("2024-03-01T10:00:00Z"),
        ),
        // Missing title: dropped before normalization.
        RawItem {
            link: Some("https://example.com/untitled".into()),
            title: None,
            summary: "vessel adrift".into(),
            published: None,
        },
        // Not maritime: dropped by the relevance filter.
        item(
            "https://example.com/rates",
            "Central bank raises rates",
            "The quarterly decision surprised analysts.",
            None,
        ),
    ]
}

fn keyword_pipeline(dir: &std::path::Path) -> Pipeline {
    let config = PipelineConfig::default();
    let store = ArtifactStore::open(dir).unwrap();
    let contract = Contract::with_retry(Arc::new(KeywordOracle), RetryPolicy::new(1, 1, 1));
    Pipeline::new(store, contract, &config)
}

#[tokio::test]
async fn full_batch_produces_expected_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = keyword_pipeline(dir.path());
    let fetcher = StaticFetcher { items: batch() };
    let normalizer = Normalizer::new(&NoopPageText, &NoopLanguageDetector);

    let summary = pipeline
        .run(&[test_source()], &fetcher, &normalizer)
        .await
        .unwrap();

    assert_eq!(summary.new_documents, 2);
    assert_eq!(summary.duplicates_skipped, 1);
    assert_eq!(summary.items_dropped, 2);
    assert_eq!(summary.classified, 2);
    assert_eq!(summary.incidents_found, 1);
    assert_eq!(summary.degraded, 0);
    assert_eq!(summary.extracted, 1);
    assert_eq!(summary.failed, 0);

    let store = pipeline.store();
    let statuses = store.list_statuses().unwrap();
    assert_eq!(statuses.len(), 2);

    // The incident document went all the way through extraction.
    let incident = statuses.iter().find(|r| r.stage == Stage::Extracted).unwrap();
    let extraction: extract::ExtractionResult = store
        .read_artifact(ArtifactKind::Extraction, &incident.doc_id)
        .unwrap();
    assert_eq!(extraction.vessel.as_deref(), Some("MV Example One"));
    assert_eq!(extraction.imo.as_deref(), Some("1234567"));
    assert_eq!(extraction.port.as_deref(), Some("Port Hedland"));
    // No date in the text, so the published_at date portion fills in.
    assert_eq!(extraction.date, chrono::NaiveDate::from_ymd_opt(2024, 3, 1));

    // The non-incident stays classified with no extraction artifact.
    let negative = statuses.iter().find(|r| r.stage == Stage::Classified).unwrap();
    assert!(!store.artifact_exists(ArtifactKind::Extraction, &negative.doc_id));
    let cls: classify::ClassificationResult = store
        .read_artifact(ArtifactKind::Classification, &negative.doc_id)
        .unwrap();
    assert!(!cls.classification.is_incident);

    assert_eq!(store.read_catalog().unwrap().len(), 2);
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = StaticFetcher { items: batch() };
    let normalizer = Normalizer::new(&NoopPageText, &NoopLanguageDetector);

    let first = keyword_pipeline(dir.path());
    first.run(&[test_source()], &fetcher, &normalizer).await.unwrap();

    // Fresh pipeline over the same store: everything is already seen.
    let second = keyword_pipeline(dir.path());
    let summary = second.run(&[test_source()], &fetcher, &normalizer).await.unwrap();

    assert_eq!(summary.new_documents, 0);
    assert_eq!(summary.duplicates_skipped, 3);
    assert_eq!(summary.classified, 0);
    assert_eq!(summary.extracted, 0);

    let store = second.store();
    assert_eq!(store.count_artifacts(ArtifactKind::Document).unwrap(), 2);
    assert_eq!(store.count_artifacts(ArtifactKind::Classification).unwrap(), 2);
    assert_eq!(store.count_artifacts(ArtifactKind::Extraction).unwrap(), 1);
    assert_eq!(store.read_catalog().unwrap().len(), 2);
}

#[tokio::test]
async fn oracle_outage_degrades_but_completes_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default();
    let store = ArtifactStore::open(dir.path()).unwrap();
    // Tiny backoff so the retries burn milliseconds, not seconds.
    let contract = Contract::with_retry(Arc::new(DownOracle), RetryPolicy::new(3, 1, 2));
    let pipeline = Pipeline::new(store, contract, &config);

    let fetcher = StaticFetcher { items: batch() };
    let normalizer = Normalizer::new(&NoopPageText, &NoopLanguageDetector);
    let summary = pipeline.run(&[test_source()], &fetcher, &normalizer).await.unwrap();

    assert_eq!(summary.classified, 2);
    assert_eq!(summary.degraded, 2);
    assert_eq!(summary.incidents_found, 0);
    assert_eq!(summary.extracted, 0);
    assert_eq!(summary.failed, 0);

    // Degraded results are schema-valid conservative negatives.
    let store = pipeline.store();
    for record in store.list_statuses().unwrap() {
        assert_eq!(record.stage, Stage::Classified);
        let cls: classify::ClassificationResult = store
            .read_artifact(ArtifactKind::Classification, &record.doc_id)
            .unwrap();
        assert!(!cls.classification.is_incident);
        assert_eq!(cls.classification.confidence, 0.0);
        assert_eq!(cls.classification.rationale, "error");
        assert!(!store.artifact_exists(ArtifactKind::Extraction, &record.doc_id));
    }
}

#[tokio::test]
async fn resumes_by_stage_not_by_memory() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = StaticFetcher { items: batch() };
    let normalizer = Normalizer::new(&NoopPageText, &NoopLanguageDetector);

    // First run only normalizes, as if the process died before classify.
    let first = keyword_pipeline(dir.path());
    let mut partial = pipeline::RunSummary::default();
    first
        .normalize_stage(&[test_source()], &fetcher, &normalizer, &mut partial)
        .await
        .unwrap();
    assert_eq!(partial.new_documents, 2);

    // A fresh pipeline picks up from the status records alone.
    let second = keyword_pipeline(dir.path());
    let mut resumed = pipeline::RunSummary::default();
    second.classify_stage(&mut resumed).await.unwrap();
    second.extract_stage(&mut resumed).unwrap();

    assert_eq!(resumed.classified, 2);
    assert_eq!(resumed.incidents_found, 1);
    assert_eq!(resumed.extracted, 1);
}
