use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use storefront_chat::ChatError;
use storefront_store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    
    #[error("Invalid request: {0}")]
    BadRequest(String),
    
    #[error("Write failed: {0}")]
    WriteFailed(String),
    
    /// Store or completion provider unreachable
    #[error("Upstream unavailable: {0}")]
    Upstream(String),
    
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::WriteFailed { .. } => ApiError::WriteFailed(err.to_string()),
            ref e if e.is_unavailable() => ApiError::Upstream(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest(err.to_string()),
            ChatError::Completion(_) | ChatError::Interrupted => ApiError::Upstream(err.to_string()),
            ChatError::History(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) | ApiError::WriteFailed(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Upstream(ref detail) => {
                tracing::error!("Upstream error: {}", detail);
                (StatusCode::BAD_GATEWAY, "Upstream service unavailable".to_string())
            }
            ApiError::Internal(ref detail) => {
                tracing::error!("Internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        
        let body = Json(json!({
            "error": message
        }));
        
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_store_errors_map_to_status() {
        let cases = [
            (StoreError::not_found("Product", 1), StatusCode::NOT_FOUND),
            (StoreError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (StoreError::write_failed("products", "insert"), StatusCode::BAD_REQUEST),
            (StoreError::Unavailable("down".into()), StatusCode::BAD_GATEWAY),
            (StoreError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
    
    #[test]
    fn test_chat_errors_map_to_status() {
        let interrupted = ApiError::from(ChatError::Interrupted).into_response();
        assert_eq!(interrupted.status(), StatusCode::BAD_GATEWAY);
        
        let empty = ApiError::from(ChatError::EmptyMessage).into_response();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    }
}
