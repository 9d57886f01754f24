use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /health
/// Returns service status, version and how many chunks are indexed.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let indexed_chunks = state
        .index
        .count()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hrbot",
        "indexed_chunks": indexed_chunks,
        "data_dir": state.config.data_dir.display().to_string()
    })))
}
