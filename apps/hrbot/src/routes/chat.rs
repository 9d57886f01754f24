use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assistant::ChatReply;
use crate::errors::AppError;
use crate::ingest::IngestReport;
use crate::rag::history::ConversationRecord;
use crate::rag::QueryResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub records: Vec<ConversationRecord>,
}

/// POST /api/v1/chat
/// Full assistant turn: greeting/closing/short checks, then retrieval.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    // Empty messages fall through to the too-short reply.
    let reply = state.assistant.reply(&req.message).await?;
    Ok(Json(reply))
}

/// POST /api/v1/query
/// Query engine only, no intent pre-filter.
pub async fn handle_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("question must not be empty".to_string()));
    }

    let engine = state.assistant.engine();
    let top_k = req.top_k.unwrap_or(engine.settings().top_k);
    if top_k == 0 {
        return Err(AppError::Validation("top_k must be at least 1".to_string()));
    }

    let response = engine.query_with_top_k(question, top_k).await?;
    Ok(Json(response))
}

/// GET /api/v1/history
pub async fn handle_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        records: state.assistant.engine().history(),
    })
}

/// POST /api/v1/ingest
/// Clears the index and re-reads every PDF in the data directory.
pub async fn handle_reingest(
    State(state): State<AppState>,
) -> Result<Json<IngestReport>, AppError> {
    let report = state.ingestion.reingest().await?;
    Ok(Json(report))
}
