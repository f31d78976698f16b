use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use crate::errors::BenchError;
use crate::utils::formatting::truncate_error;
use super::provider::LLMProvider;
use super::types::{Prompt, ResponseRecord};
use tracing::debug;

/// Chat-completions adapter. Also serves any OpenAI-compatible endpoint
/// (Gemini's compatibility layer) through `with_base_url`.
pub struct OpenAIProvider {
    client: Client,
    name: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn with_base_url(name: &str, base_url: &str, timeout: Duration) -> Result<Self, BenchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(
        &self,
        model: &str,
        prompt: &Prompt,
        api_key: Option<&str>,
    ) -> Result<ResponseRecord, BenchError> {
        let api_key = api_key
            .ok_or_else(|| BenchError::MissingCredential(format!("{} API key", self.name)))?;

        let body = json!({
            "model": model,
            "messages": prompt.turns(),
        });

        let start = Instant::now();

        let resp = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| BenchError::from_transport(&self.name, e))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(BenchError::RateLimit(format!("{} rate limit", self.name)));
        }
        if status.as_u16() == 401 {
            return Err(BenchError::Authentication(format!("Invalid {} API key", self.name)));
        }

        let text = resp.text().await
            .map_err(|e| BenchError::from_transport(&self.name, e))?;
        let elapsed = start.elapsed();

        let data: Value = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) if status.is_success() => {
                return Err(BenchError::LLMApi(format!("Failed to parse {} response: {}", self.name, e)));
            }
            Err(_) => {
                return Err(BenchError::LLMApi(format!(
                    "{} returned HTTP {}: {}",
                    self.name,
                    status,
                    truncate_error(&text)
                )));
            }
        };

        if let Some(error) = data.get("error") {
            let message = error["message"].as_str()
                .or_else(|| error.as_str())
                .unwrap_or("Unknown error");
            return Err(BenchError::LLMApi(message.to_string()));
        }
        if !status.is_success() {
            return Err(BenchError::LLMApi(format!("{} returned HTTP {}", self.name, status)));
        }

        let content = data["choices"][0]["message"]["content"].as_str()
            .ok_or_else(|| BenchError::LLMApi(format!("No content in {} response", self.name)))?
            .to_string();

        debug!(
            provider = %self.name,
            model,
            prompt_tokens = data["usage"]["prompt_tokens"].as_u64(),
            completion_tokens = data["usage"]["completion_tokens"].as_u64(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Chat completion"
        );

        Ok(ResponseRecord::new(model, prompt, content, elapsed))
    }

    fn provider_name(&self) -> &str { &self.name }
}
