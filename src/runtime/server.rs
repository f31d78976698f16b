use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::BenchError;

/// HTTP management surface of the local model server.
#[async_trait]
pub trait LocalServerApi: Send + Sync {
    /// True once the server answers HTTP requests.
    async fn ping(&self) -> bool;

    /// Names of the models installed locally, e.g. `llama3.2:latest`.
    async fn list_models(&self) -> Result<Vec<String>, BenchError>;

    /// Download a model, blocking until the pull has finished.
    async fn pull(&self, model: &str) -> Result<(), BenchError>;
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<InstalledModel>,
}

#[derive(Deserialize)]
struct InstalledModel {
    name: String,
}

pub struct OllamaServer {
    client: Client,
    pull_client: Client,
    endpoint: String,
}

impl OllamaServer {
    pub fn new(endpoint: &str, pull_timeout: Duration) -> Result<Self, BenchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| BenchError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let pull_client = Client::builder()
            .timeout(pull_timeout)
            .build()
            .map_err(|e| BenchError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            pull_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LocalServerApi for OllamaServer {
    async fn ping(&self) -> bool {
        match self.client.get(format!("{}/api/version", self.endpoint)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "Local server not reachable yet");
                false
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, BenchError> {
        let resp = self.client
            .get(format!("{}/api/tags", self.endpoint))
            .send()
            .await
            .map_err(|e| BenchError::LocalRuntime(format!("Failed to list local models: {}", e)))?;

        if !resp.status().is_success() {
            return Err(BenchError::LocalRuntime(format!(
                "Listing local models returned HTTP {}",
                resp.status()
            )));
        }

        let tags: TagsResponse = resp.json().await
            .map_err(|e| BenchError::LocalRuntime(format!("Invalid model list: {}", e)))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn pull(&self, model: &str) -> Result<(), BenchError> {
        let resp = self.pull_client
            .post(format!("{}/api/pull", self.endpoint))
            .json(&json!({"model": model, "stream": false}))
            .send()
            .await
            .map_err(|e| BenchError::LocalRuntime(format!("Pull request failed: {}", e)))?;

        let status = resp.status();
        let data: Value = resp.json().await.unwrap_or(Value::Null);

        if let Some(error) = data["error"].as_str() {
            return Err(BenchError::LocalRuntime(error.to_string()));
        }
        if !status.is_success() {
            return Err(BenchError::LocalRuntime(format!("Pull returned HTTP {}", status)));
        }
        if data["status"] != "success" {
            return Err(BenchError::LocalRuntime(format!("Pull did not complete: {}", data)));
        }
        Ok(())
    }
}
