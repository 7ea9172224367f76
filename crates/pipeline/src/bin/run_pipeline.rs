use anyhow::{Context, Result};
use classify::{ChatOracle, Contract, KeywordOracle, Oracle};
use ingest::sources::{NoopLanguageDetector, NoopPageText};
use ingest::{FileFetcher, Normalizer, Source};
use pipeline::{ArtifactStore, Pipeline, PipelineConfig};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = PipelineConfig::default();
    let data_dir = std::env::args().nth(1).map(Into::into).unwrap_or(config.data_dir.clone());

    println!("=== Maritime Incident Pipeline ===\n");

    let sources = read_sources(&data_dir.join("sources.json"))?;
    println!("Sources: {}", sources.len());

    let oracle = select_oracle()?;
    println!("Oracle: {}\n", oracle.name());

    let store = ArtifactStore::open(&data_dir)?;
    let contract = Contract::with_retry(oracle, config.retry.policy());
    let pipeline = Pipeline::new(store, contract, &config);

    let fetcher = FileFetcher::new(data_dir.join("raw"));
    let normalizer = Normalizer::new(&NoopPageText, &NoopLanguageDetector);

    let summary = pipeline.run(&sources, &fetcher, &normalizer).await?;

    println!("=== RUN SUMMARY ===");
    println!("  New documents:      {}", summary.new_documents);
    println!("  Duplicates skipped: {}", summary.duplicates_skipped);
    println!("  Items dropped:      {}", summary.items_dropped);
    println!("  Classified:         {}", summary.classified);
    println!("  Incidents found:    {}", summary.incidents_found);
    println!("  Degraded results:   {}", summary.degraded);
    println!("  Extracted:          {}", summary.extracted);
    println!("  Failed:             {}", summary.failed);

    Ok(())
}

fn read_sources(path: &Path) -> Result<Vec<Source>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read sources file: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid sources file: {}", path.display()))
}

/// ORACLE_PROVIDER=chat selects the hosted model; anything else (or unset)
/// runs the deterministic keyword oracle.
fn select_oracle() -> Result<Arc<dyn Oracle>> {
    match std::env::var("ORACLE_PROVIDER").as_deref() {
        Ok("chat") => Ok(Arc::new(ChatOracle::from_env()?)),
        _ => Ok(Arc::new(KeywordOracle)),
    }
}
