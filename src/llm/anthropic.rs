use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use crate::errors::BenchError;
use crate::utils::formatting::truncate_error;
use super::provider::LLMProvider;
use super::types::{Prompt, ResponseRecord, Role, Turn};
use tracing::debug;

const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.7;

pub struct AnthropicProvider {
    client: Client,
    base_url: String,
}

impl AnthropicProvider {
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, BenchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Separate a leading system turn from the conversational turns.
pub(crate) fn split_system(turns: Vec<Turn>) -> Result<(Option<String>, Vec<Turn>), BenchError> {
    let mut iter = turns.into_iter();
    match iter.next() {
        None => Err(BenchError::Validation("Prompt has no turns".into())),
        Some(first) if first.role == Role::System => Ok((Some(first.content), iter.collect())),
        Some(first) => {
            let mut rest = vec![first];
            rest.extend(iter);
            Ok((None, rest))
        }
    }
}

pub(crate) fn build_body(model: &str, prompt: &Prompt) -> Result<Value, BenchError> {
    let (system, messages) = split_system(prompt.turns())?;

    let mut body = json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "temperature": TEMPERATURE,
    });
    if let Some(sys) = system {
        body["system"] = json!(sys);
    }
    if !messages.is_empty() {
        body["messages"] = json!(messages);
    }
    Ok(body)
}

/// Concatenate text blocks in order; tool-use and other block types are skipped.
fn collect_text(data: &Value) -> Option<String> {
    let blocks = data["content"].as_array()?;
    Some(
        blocks
            .iter()
            .filter(|b| b["type"] == "text")
            .filter_map(|b| b["text"].as_str())
            .collect::<String>(),
    )
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    async fn complete(
        &self,
        model: &str,
        prompt: &Prompt,
        api_key: Option<&str>,
    ) -> Result<ResponseRecord, BenchError> {
        let api_key = api_key
            .ok_or_else(|| BenchError::MissingCredential("anthropic API key".into()))?;

        let body = build_body(model, prompt)?;

        let start = Instant::now();

        let resp = self.client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BenchError::from_transport("anthropic", e))?;

        let status = resp.status();
        if status == 429 {
            return Err(BenchError::RateLimit("Anthropic rate limit exceeded".into()));
        }
        if status == 401 {
            return Err(BenchError::Authentication("Invalid Anthropic API key".into()));
        }

        let text = resp.text().await
            .map_err(|e| BenchError::from_transport("anthropic", e))?;
        let elapsed = start.elapsed();

        let data: Value = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) if status.is_success() => {
                return Err(BenchError::LLMApi(format!("Failed to parse Anthropic response: {}", e)));
            }
            Err(_) => {
                return Err(BenchError::LLMApi(format!(
                    "Anthropic returned HTTP {}: {}",
                    status,
                    truncate_error(&text)
                )));
            }
        };

        if let Some(error) = data.get("error") {
            let msg = error["message"].as_str().unwrap_or("Unknown error");
            return Err(BenchError::LLMApi(msg.to_string()));
        }
        if !status.is_success() {
            return Err(BenchError::LLMApi(format!("Anthropic returned HTTP {}", status)));
        }

        let content = collect_text(&data)
            .ok_or_else(|| BenchError::LLMApi("No content in Anthropic response".into()))?;

        debug!(
            model,
            input_tokens = data["usage"]["input_tokens"].as_u64(),
            output_tokens = data["usage"]["output_tokens"].as_u64(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Anthropic completion"
        );

        Ok(ResponseRecord::new(model, prompt, content, elapsed))
    }

    fn provider_name(&self) -> &str { "anthropic" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_split_system_first_turn() {
        let (system, rest) = split_system(vec![Turn::system("be terse"), Turn::user("hi")]).unwrap();
        assert_eq!(system.as_deref(), Some("be terse"));
        assert_eq!(rest, vec![Turn::user("hi")]);
    }

    #[test]
    fn test_split_without_system_keeps_all_turns() {
        let (system, rest) = split_system(vec![Turn::user("hi"), Turn::assistant("hello")]).unwrap();
        assert!(system.is_none());
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn test_split_empty_is_validation_error() {
        let err = split_system(vec![]).unwrap_err();
        assert!(matches!(err, BenchError::Validation(_)));
    }

    #[test]
    fn test_single_system_turn_has_no_messages_field() {
        let body = build_body("claude-3-5-haiku", &Prompt::Turns(vec![Turn::system("be terse")])).unwrap();
        assert_eq!(body["system"], "be terse");
        assert!(body.get("messages").is_none());
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_multi_turn_populates_both_fields() {
        let prompt = Prompt::Turns(vec![Turn::system("be terse"), Turn::user("hi")]);
        let body = build_body("claude-3-5-haiku", &prompt).unwrap();
        assert_eq!(body["system"], "be terse");
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hi"}]));
    }

    #[test]
    fn test_flat_prompt_becomes_user_message() {
        let body = build_body("claude-3-5-haiku", &Prompt::Text("hi".into())).unwrap();
        assert!(body.get("system").is_none());
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hi"}]));
    }

    #[test]
    fn test_collect_text_skips_non_text_blocks() {
        let data = json!({
            "content": [
                {"type": "text", "text": "Hello, "},
                {"type": "tool_use", "id": "t1", "name": "calc", "input": {}},
                {"type": "text", "text": "world"}
            ]
        });
        assert_eq!(collect_text(&data).as_deref(), Some("Hello, world"));
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/v1/messages")
            .match_header("x-api-key", "ak-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(json!({
                "model": "claude-3-5-haiku",
                "system": "be terse",
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"hey"}],"usage":{"input_tokens":3,"output_tokens":1}}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(&server.url(), Duration::from_secs(5)).unwrap();
        let prompt = Prompt::Turns(vec![Turn::system("be terse"), Turn::user("hi")]);
        let record = provider.complete("claude-3-5-haiku", &prompt, Some("ak-test")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.response, "hey");
        assert_eq!(record.model, "claude-3-5-haiku");
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_network() {
        let provider = AnthropicProvider::with_base_url("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = provider.complete("claude-3", &Prompt::Turns(vec![]), Some("k")).await.unwrap_err();
        assert!(matches!(err, BenchError::Validation(_)));
    }

    #[tokio::test]
    async fn test_provider_error_object() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/v1/messages")
            .with_status(400)
            .with_body(r#"{"type":"error","error":{"type":"invalid_request_error","message":"messages: field required"}}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(&server.url(), Duration::from_secs(5)).unwrap();
        let err = provider
            .complete("claude-3", &Prompt::Turns(vec![Turn::system("x")]), Some("k"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "LLM API error: messages: field required");
    }

    #[tokio::test]
    async fn test_gateway_error_page_keeps_status() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/v1/messages")
            .with_status(503)
            .with_body("upstream connect error")
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(&server.url(), Duration::from_secs(5)).unwrap();
        let err = provider.complete("claude-3", &Prompt::Text("hi".into()), Some("k")).await.unwrap_err();
        assert_eq!(err.to_string(), "LLM API error: Anthropic returned HTTP 503 Service Unavailable: upstream connect error");
    }
}
