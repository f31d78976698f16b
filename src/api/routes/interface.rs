use axum::{extract::State, Json};
use tracing::debug;
use crate::api::AppState;
use crate::api::models::{GenerateInterfaceRequest, GenerateInterfaceResponse};
use crate::errors::BenchError;
use crate::llm::types::{Prompt, Turn};
use crate::pipeline::RunError;
use crate::utils::formatting::strip_code_fences;

const INTERFACE_INSTRUCTIONS: &str = "You are an expert front-end developer building small educational \
web interfaces. Given a description, produce a single self-contained HTML document with inline CSS \
and JavaScript. The interface must work offline, use no external libraries, and be usable on both \
desktop and mobile screens. Respond with the HTML only, without explanations.";

pub async fn generate_interface(
    State(state): State<AppState>,
    Json(req): Json<GenerateInterfaceRequest>,
) -> Result<Json<GenerateInterfaceResponse>, RunError> {
    let description = req.description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| BenchError::Validation("No description provided".into()))?;
    let model = req.model
        .filter(|m| !m.is_empty())
        .ok_or_else(|| BenchError::Validation("No model provided".into()))?;

    if req.use_rag {
        debug!("Example retrieval requested but not supported, continuing without it");
    }

    let prompt = Prompt::Turns(vec![
        Turn::system(INTERFACE_INSTRUCTIONS),
        Turn::user(&description),
    ]);

    let record = state.pipeline.run_with(&model, &prompt, |text| strip_code_fences(&text)).await?;
    Ok(Json(GenerateInterfaceResponse { record, description }))
}
