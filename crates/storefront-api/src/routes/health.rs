use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use storefront_chat::SessionStore;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

pub async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Storefront API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint
/// 
/// Reports the store connection and the number of live chat sessions
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();
    
    match state.store.health_check().await {
        Ok(_) => services.insert("store".to_string(), "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            services.insert("store".to_string(), "disconnected".to_string())
        }
    };
    services.insert("chat_sessions".to_string(), state.sessions.len().await.to_string());
    
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
