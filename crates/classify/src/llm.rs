use crate::oracle::{Oracle, OracleError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = r#"You are a cautious maritime risk analyst. Decide if the text describes a real maritime incident.
Incident types ONLY: "grounding","collision","fire","piracy","weather","port_closure","strike","spill".
Rules:
- Policy/sanctions/market news ≠ incident.
- Forecasts/rumors without an event ≠ incident.
- "Prevented/averted" counts as incident, set near_miss=true.
Return STRICT JSON only:
{ "is_incident": <bool>, "incident_types": <array>, "near_miss": <bool>, "confidence": <0..1>, "rationale": "<≤12 words>" }"#;

/// Oracle backed by an OpenAI-compatible chat-completions endpoint.
/// Output is requested as strict JSON but never trusted; the contract's
/// sanitizer does the real validation.
#[derive(Clone)]
pub struct ChatOracle {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ChatOracle {
    pub fn new(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            endpoint,
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// Build from environment: ORACLE_ENDPOINT, ORACLE_API_KEY, ORACLE_MODEL.
    pub fn from_env() -> anyhow::Result<Self> {
        let endpoint = std::env::var("ORACLE_ENDPOINT")
            .map_err(|_| anyhow::anyhow!("ORACLE_ENDPOINT not set"))?;
        let api_key =
            std::env::var("ORACLE_API_KEY").map_err(|_| anyhow::anyhow!("ORACLE_API_KEY not set"))?;
        let model = std::env::var("ORACLE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Ok(Self::new(endpoint, api_key, model))
    }
}

#[async_trait]
impl Oracle for ChatOracle {
    async fn classify_raw(&self, text: &str) -> Result<serde_json::Value, OracleError> {
        let user_content = format!("Text:\n{text}");
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            response_format: ResponseFormat { format_type: "json_object" },
            messages: vec![
                Message { role: "system", content: SYSTEM_PROMPT },
                Message { role: "user", content: &user_content },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    OracleError::Transient(e.to_string())
                } else {
                    OracleError::Malformed(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(OracleError::Transient(format!("oracle returned {status}")));
        }
        if !status.is_success() {
            return Err(OracleError::Malformed(format!("oracle returned {status}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(format!("bad response body: {e}")))?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| OracleError::Malformed("response had no choices".into()))?;

        serde_json::from_str(content)
            .map_err(|e| OracleError::Malformed(format!("model did not return JSON: {e}")))
    }

    fn name(&self) -> &str {
        "chat"
    }
}
