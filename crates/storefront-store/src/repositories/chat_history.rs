use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::models::ChatHistoryEntry;
use crate::table::{from_row, from_rows, tables, to_row, Filter, TableStore};

/// Append-only `chat_history` table
#[derive(Clone)]
pub struct ChatHistoryRepository {
    store: Arc<dyn TableStore>,
}

impl ChatHistoryRepository {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, entry: &ChatHistoryEntry) -> Result<ChatHistoryEntry> {
        self.store
            .insert(tables::CHAT_HISTORY, vec![to_row(entry)?])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::write_failed(tables::CHAT_HISTORY, "insert"))
            .and_then(from_row)
    }

    /// Entries for a user, oldest first
    pub async fn history(&self, user_id: &str) -> Result<Vec<ChatHistoryEntry>> {
        let filter = Filter::all().eq("user_id", user_id).order("id", false);
        from_rows(self.store.select(tables::CHAT_HISTORY, &filter).await?)
    }
}
