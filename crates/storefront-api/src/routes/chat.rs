use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use storefront_store::ChatHistoryEntry;
use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub history: Vec<ChatHistoryEntry>,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatMessageRequest>,
) -> ApiResult<Json<ChatMessageResponse>> {
    let response = state.chat.send(&req.user_id, &req.message).await?;
    Ok(Json(ChatMessageResponse { response }))
}

pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ChatHistoryResponse>> {
    let history = state.chat.history(&query.user_id).await?;
    Ok(Json(ChatHistoryResponse { history }))
}
