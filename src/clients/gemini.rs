use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::AiConfig;

/// Errors from the generative provider. None of these are fatal to the
/// recommendation flow; callers degrade to the local heuristic.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The provider does not implement this call shape.
    #[error("Unsupported model method: {0}")]
    Unsupported(&'static str),

    #[error("Model transport error: {0}")]
    Transport(String),

    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// A generative text provider. Providers may support any subset of the three
/// call shapes; unsupported ones return [`ModelError::Unsupported`] and the
/// caller tries the next shape in its preference order.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model ids the provider currently reports as available.
    async fn list_models(&self) -> Result<Vec<String>, ModelError>;

    /// Direct content generation (the modern Gemini call shape).
    async fn generate_content(&self, prompt: &str) -> Result<Value, ModelError>;

    /// Generic text generation (the legacy PaLM call shape).
    async fn generate(&self, prompt: &str) -> Result<Value, ModelError>;

    /// Prediction-style invocation.
    async fn predict(&self, prompt: &str) -> Result<Value, ModelError>;
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    candidates: Vec<String>,
    /// Model id chosen on first use, cached for the process lifetime.
    chosen: RwLock<Option<String>>,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Anitrack/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build Gemini HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            candidates: config.candidate_models.clone(),
            chosen: RwLock::new(None),
        })
    }

    fn model_path(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    /// Pick a model id: prefer the first candidate the listing reports as
    /// available, matched case-insensitively in either containment direction.
    /// When the listing itself fails, fall back to the first candidate
    /// without probing.
    async fn pick_model(&self) -> Result<String, ModelError> {
        if let Some(model) = self.chosen.read().await.clone() {
            return Ok(model);
        }

        let picked = match self.list_models().await {
            Ok(available) => self
                .candidates
                .iter()
                .find(|candidate| {
                    let c = candidate.to_lowercase();
                    available.iter().any(|a| {
                        let a = a.to_lowercase();
                        a.contains(&c) || c.contains(&a)
                    })
                })
                .cloned(),
            Err(e) => {
                warn!("Model listing not available: {e}");
                None
            }
        };

        let model = picked
            .or_else(|| self.candidates.first().cloned())
            .ok_or(ModelError::Unsupported("no candidate models configured"))?;

        debug!("Using generative model: {model}");
        *self.chosen.write().await = Some(model.clone());
        Ok(model)
    }

    async fn post_json(&self, url: &str, body: Value) -> Result<Value, ModelError> {
        let response = self.client.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn list_models(&self) -> Result<Vec<String>, ModelError> {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;

        // The listing arrives either as {"models": [...]} or a bare array.
        let models = body
            .get("models")
            .and_then(Value::as_array)
            .or_else(|| body.as_array())
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| {
                        m.get("name")
                            .or_else(|| m.get("id"))
                            .or_else(|| m.get("model"))
                            .and_then(Value::as_str)
                            .map(ToString::to_string)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn generate_content(&self, prompt: &str) -> Result<Value, ModelError> {
        let model = self.pick_model().await?;
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url,
            Self::model_path(&model),
            self.api_key
        );

        self.post_json(
            &url,
            json!({ "contents": [{ "parts": [{ "text": prompt }] }] }),
        )
        .await
    }

    async fn generate(&self, prompt: &str) -> Result<Value, ModelError> {
        let model = self.pick_model().await?;
        let url = format!(
            "{}/{}:generateText?key={}",
            self.base_url,
            Self::model_path(&model),
            self.api_key
        );

        self.post_json(&url, json!({ "prompt": { "text": prompt } }))
            .await
    }

    async fn predict(&self, prompt: &str) -> Result<Value, ModelError> {
        let model = self.pick_model().await?;
        let url = format!(
            "{}/{}:predict?key={}",
            self.base_url,
            Self::model_path(&model),
            self.api_key
        );

        self.post_json(&url, json!({ "instances": [{ "prompt": prompt }] }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_path_keeps_existing_prefix() {
        assert_eq!(
            GeminiClient::model_path("models/text-bison-001"),
            "models/text-bison-001"
        );
        assert_eq!(GeminiClient::model_path("gemini-pro"), "models/gemini-pro");
    }
}
