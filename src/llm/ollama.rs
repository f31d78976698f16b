use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use crate::errors::BenchError;
use crate::utils::formatting::truncate_error;
use super::provider::LLMProvider;
use super::types::{Prompt, ResponseRecord};
use tracing::{debug, warn};

/// Local completion adapter. Assumes the runtime manager already made the
/// server and model available.
pub struct OllamaProvider {
    client: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
    eval_count: Option<u32>,
    prompt_eval_count: Option<u32>,
}

impl OllamaProvider {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, BenchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn complete(
        &self,
        model: &str,
        prompt: &Prompt,
        _api_key: Option<&str>,
    ) -> Result<ResponseRecord, BenchError> {
        let request = GenerateRequest {
            model,
            prompt: prompt.flatten(),
            stream: false,
        };

        let start = Instant::now();

        let resp = self.client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| BenchError::from_transport("ollama", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BenchError::LLMApi(format!("Local generate returned HTTP {}: {}", status, truncate_error(&body))));
        }

        let data: GenerateResponse = resp.json().await
            .map_err(|e| BenchError::LLMApi(format!("Failed to parse local response: {}", e)))?;

        let elapsed = start.elapsed();

        if !data.done {
            warn!(model, "Local response indicates incomplete generation");
        }
        debug!(
            model,
            prompt_tokens = data.prompt_eval_count,
            eval_tokens = data.eval_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "Local completion"
        );

        Ok(ResponseRecord::new(model, prompt, data.response, elapsed))
    }

    fn provider_name(&self) -> &str { "local" }
}
