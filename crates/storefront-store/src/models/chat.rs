use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exchange in the append-only chat history log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub user_id: String,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatHistoryEntry {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}
