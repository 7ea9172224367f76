use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Orchestrator settings. Defaults: 3 oracle attempts, 1s base backoff
/// capped at 6s, 4 calls in flight; the 30s per-attempt timeout lives in
/// the oracle client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub concurrency: ConcurrencyConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Upper bound on in-flight oracle calls during the classify stage.
    pub max_concurrent_oracle_calls: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            concurrency: ConcurrencyConfig {
                max_concurrent_oracle_calls: 4,
            },
            retry: RetryConfig {
                max_attempts: 3,
                initial_backoff_ms: 1000,
                max_backoff_ms: 6000,
            },
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> classify::RetryPolicy {
        classify::RetryPolicy::new(self.max_attempts, self.initial_backoff_ms, self.max_backoff_ms)
    }
}
