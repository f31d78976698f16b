use axum::{extract::{Query, State}, Json};
use serde_json::{json, Value};
use crate::api::AppState;
use crate::api::models::ListQuery;
use crate::errors::BenchError;

pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, BenchError> {
    let limit = query.limit.unwrap_or(50).min(500);
    let offset = query.offset.unwrap_or(0);

    let store = state.store.clone();
    let (records, total) = tokio::task::spawn_blocking(move || -> Result<_, BenchError> {
        Ok((store.list(limit, offset)?, store.count()?))
    })
    .await
    .map_err(|e| BenchError::Internal(format!("Record query task failed: {}", e)))??;

    Ok(Json(json!({ "records": records, "total": total })))
}
