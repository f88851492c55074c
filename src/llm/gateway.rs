//! Completion gateway: one chat-completion call to an OpenAI-compatible API.
//!
//! Stateless and at-most-once: no retries, no streaming. Callers decide
//! what a failure means for the user; this layer only reports what
//! happened.

use async_trait::async_trait;
use std::time::Duration;

use super::prompts::{MODEL, TEMPERATURE};
use super::provider::mask_token;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const APP_TITLE: &str = "BeanZ Bot";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response payload: {0}")]
    Payload(String),
}

impl GatewayError {
    /// True when the service was never reached (or never could be).
    ///
    /// Status and payload errors mean the service answered, just badly.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GatewayError::MissingApiKey | GatewayError::Transport(_))
    }
}

/// The capability the reply pipeline depends on.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, system: &str, transcript: &str) -> Result<String, GatewayError>;
}

/// Settings for [`OpenRouterGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub site_url: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: MODEL.to_string(),
            temperature: TEMPERATURE,
            site_url: DEFAULT_SITE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// OpenRouter (or any OpenAI-compatible) chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenRouterGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl OpenRouterGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionGateway for OpenRouterGateway {
    async fn complete(&self, system: &str, transcript: &str) -> Result<String, GatewayError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(k) if !k.is_empty() => k,
            _ => {
                log::warn!("[LLM] No API key configured, skipping completion call");
                return Err(GatewayError::MissingApiKey);
            }
        };

        log::info!("[LLM] Model: {} (key {})", self.config.model, mask_token(api_key));
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", APP_TITLE)
            .json(&serde_json::json!({
                "model": self.config.model,
                "temperature": self.config.temperature,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": transcript },
                ]
            }))
            .send()
            .await
            .map_err(|e| {
                log::error!("[LLM] HTTP request failed: {}", e);
                GatewayError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        log::info!("[LLM] API latency: {}ms", start.elapsed().as_millis());

        if !status.is_success() {
            let preview: String = body.chars().take(200).collect();
            log::error!("[LLM] API returned {}: {}", status, preview);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_content(&body)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions body.
///
/// A well-formed body with no content yields an empty string; the parser
/// treats that like any other empty completion.
pub fn extract_content(body: &str) -> Result<String, GatewayError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| GatewayError::Payload(e.to_string()))?;
    if !json.is_object() {
        return Err(GatewayError::Payload("body is not a JSON object".to_string()));
    }
    Ok(json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string())
}
