use chrono::{DateTime, Utc};
use storefront_llm::Message;

/// Conversation state for one user
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub user_id: String,
    /// Correlates requests with provider-side conversation state
    pub thread_token: String,
    pub transcript: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let now = Utc::now();
        Self {
            thread_token: Self::thread_token_for(&user_id),
            user_id,
            transcript: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn thread_token_for(user_id: &str) -> String {
        format!("user_{user_id}")
    }

    pub fn push(&mut self, message: Message) {
        self.transcript.push(message);
        self.last_active = Utc::now();
    }
}
