use async_trait::async_trait;
use std::collections::HashMap;
use storefront_store::{ChatHistoryEntry, ChatHistoryRepository};
use tokio::sync::RwLock;

use crate::error::Result;

/// Append-only log of completed exchanges, independent of the transcript
#[async_trait]
pub trait ChatHistoryLog: Send + Sync {
    async fn append(&self, entry: ChatHistoryEntry) -> Result<()>;

    /// Entries for a user, oldest first
    async fn history(&self, user_id: &str) -> Result<Vec<ChatHistoryEntry>>;
}

#[derive(Default)]
pub struct MemoryChatHistory {
    entries: RwLock<HashMap<String, Vec<ChatHistoryEntry>>>,
}

impl MemoryChatHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatHistoryLog for MemoryChatHistory {
    async fn append(&self, entry: ChatHistoryEntry) -> Result<()> {
        self.entries
            .write()
            .await
            .entry(entry.user_id.clone())
            .or_default()
            .push(entry);
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<ChatHistoryEntry>> {
        Ok(self.entries.read().await.get(user_id).cloned().unwrap_or_default())
    }
}

/// History kept in the `chat_history` table
pub struct StoreChatHistory {
    repository: ChatHistoryRepository,
}

impl StoreChatHistory {
    pub fn new(repository: ChatHistoryRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ChatHistoryLog for StoreChatHistory {
    async fn append(&self, entry: ChatHistoryEntry) -> Result<()> {
        self.repository.append(&entry).await?;
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<ChatHistoryEntry>> {
        Ok(self.repository.history(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_store::StoreClient;

    #[tokio::test]
    async fn test_backends_keep_order_per_user() {
        let store = StoreClient::in_memory();
        let logs: Vec<Box<dyn ChatHistoryLog>> = vec![
            Box::new(MemoryChatHistory::new()),
            Box::new(StoreChatHistory::new(store.chat_history().clone())),
        ];

        for log in logs {
            log.append(ChatHistoryEntry::new("a", "m1", "r1")).await.unwrap();
            log.append(ChatHistoryEntry::new("b", "x", "y")).await.unwrap();
            log.append(ChatHistoryEntry::new("a", "m2", "r2")).await.unwrap();

            let history = log.history("a").await.unwrap();
            let messages: Vec<&str> = history.iter().map(|e| e.message.as_str()).collect();
            assert_eq!(messages, vec!["m1", "m2"]);
            assert!(log.history("nobody").await.unwrap().is_empty());
        }
    }
}
