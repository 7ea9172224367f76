pub mod llm;
pub mod mock;
pub mod oracle;
pub mod retry;
pub mod sanitize;
pub mod schema;

pub use llm::ChatOracle;
pub use mock::KeywordOracle;
pub use oracle::{Oracle, OracleError};
pub use retry::RetryPolicy;
pub use sanitize::sanitize;
pub use schema::{Classification, ClassificationResult, IncidentType};

use std::sync::Arc;
use tracing::warn;

/// The classification contract: retries the injected oracle on transient
/// failures, sanitizes whatever comes back, and degrades to a conservative
/// negative when the oracle fails outright. One document's failure never
/// aborts a batch — `classify` is total.
pub struct Contract {
    oracle: Arc<dyn Oracle>,
    retry: RetryPolicy,
}

impl Contract {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(oracle: Arc<dyn Oracle>, retry: RetryPolicy) -> Self {
        Self { oracle, retry }
    }

    pub async fn classify(&self, text: &str) -> Classification {
        let raw = self
            .retry
            .retry(self.oracle.name(), || self.oracle.classify_raw(text))
            .await;

        match raw {
            Ok(value) if value.is_object() => sanitize(&value),
            Ok(value) => {
                warn!(oracle = self.oracle.name(), payload_type = json_type(&value),
                    "oracle payload was not an object, degrading");
                Classification::degraded()
            }
            Err(e) => {
                warn!(oracle = self.oracle.name(), error = %e, "oracle failed, degrading");
                Classification::degraded()
            }
        }
    }
}

fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
