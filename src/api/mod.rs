pub mod routes;
pub mod models;
pub mod errors;

use std::sync::Arc;
use axum::Router;
use tower_http::trace::TraceLayer;
use crate::config::{BenchConfig, EnvCredentials};
use crate::db::RecordStore;
use crate::errors::BenchError;
use crate::pipeline::PromptPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PromptPipeline>,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(pipeline: PromptPipeline) -> Self {
        let store = pipeline.store();
        Self { pipeline: Arc::new(pipeline), store }
    }
}

pub fn create_app_state(config: &BenchConfig) -> Result<AppState, BenchError> {
    let pipeline = PromptPipeline::from_config(config, Arc::new(EnvCredentials))?;
    Ok(AppState::new(pipeline))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", axum::routing::get(routes::health::health_check))
        .route("/api/testPrompt", axum::routing::post(routes::prompts::test_prompt))
        .route("/api/records", axum::routing::get(routes::records::list_records))
        .route("/interface/generate", axum::routing::post(routes::interface::generate_interface))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
