use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::llm::types::ResponseRecord;

/// `messages` is either a flat string or a list of `{role, content}` turns.
#[derive(Deserialize)]
pub struct TestPromptRequest {
    pub messages: Option<Value>,
    pub model: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInterfaceRequest {
    pub description: Option<String>,
    pub model: Option<String>,
    /// Accepted for compatibility; example retrieval is not performed.
    #[serde(default)]
    pub use_rag: bool,
}

/// The stored record plus the description it was generated from.
#[derive(Serialize)]
pub struct GenerateInterfaceResponse {
    #[serde(flatten)]
    pub record: ResponseRecord,
    pub description: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
