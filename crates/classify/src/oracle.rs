use async_trait::async_trait;
use thiserror::Error;

/// Ways an oracle call can fail. Transient failures are worth retrying;
/// malformed output is not — the model already answered, just badly.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Network trouble, timeout, rate limiting: retried with backoff.
    #[error("transient oracle failure: {0}")]
    Transient(String),

    /// Unparsable or schema-violating payload: degrades immediately.
    #[error("malformed oracle output: {0}")]
    Malformed(String),
}

impl OracleError {
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Transient(_))
    }
}

/// The classification oracle as an injected capability: one operation,
/// untyped output. The contract layer owns all validation; implementations
/// (hosted model, keyword test double) are interchangeable behind this.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn classify_raw(&self, text: &str) -> Result<serde_json::Value, OracleError>;

    /// Name used in logs and retry messages.
    fn name(&self) -> &str {
        "unknown"
    }
}
