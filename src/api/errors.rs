use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::BenchError;
use crate::pipeline::RunError;

impl IntoResponse for BenchError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            BenchError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

impl IntoResponse for RunError {
    fn into_response(self) -> axum::response::Response {
        match self {
            RunError::Dispatch(e) => e.into_response(),
            RunError::Unsaved { record, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": source.to_string(),
                    "kind": "persistence",
                    "record": record,
                })),
            ).into_response(),
        }
    }
}
