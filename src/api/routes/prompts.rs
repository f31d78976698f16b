use axum::{extract::State, Json};
use crate::api::AppState;
use crate::api::models::TestPromptRequest;
use crate::errors::BenchError;
use crate::llm::types::{Prompt, ResponseRecord};
use crate::pipeline::RunError;

pub async fn test_prompt(
    State(state): State<AppState>,
    Json(req): Json<TestPromptRequest>,
) -> Result<Json<ResponseRecord>, RunError> {
    let prompt = match req.messages {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(Prompt::from_value(value)?),
    }
    .filter(|p| !p.is_empty())
    .ok_or_else(|| BenchError::Validation("No prompt provided".into()))?;

    let model = req.model
        .filter(|m| !m.is_empty())
        .ok_or_else(|| BenchError::Validation("No model provided".into()))?;

    let record = state.pipeline.run(&model, &prompt).await?;
    Ok(Json(record))
}
