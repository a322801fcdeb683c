use std::sync::Arc;
use std::time::Duration;

use storefront_chat::{
    ChatHistoryLog, ChatSessionManager, ChatSettings, LruSessionStore, MemoryChatHistory,
    StoreChatHistory,
};
use storefront_llm::ChatClient;
use storefront_recommend::RecommendationEngine;
use storefront_store::StoreClient;

use crate::config::{Config, HistoryBackend};

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: StoreClient,
    pub recommendations: RecommendationEngine,
    pub chat: ChatSessionManager,
    pub sessions: Arc<LruSessionStore>,
}

impl AppState {
    pub fn new(config: Config, store: StoreClient, chat_client: Arc<dyn ChatClient>) -> Self {
        let sessions = Arc::new(LruSessionStore::new(
            config.chat.session_capacity,
            Duration::from_secs(config.chat.session_ttl_secs),
        ));
        let history: Arc<dyn ChatHistoryLog> = match config.chat.history {
            HistoryBackend::Memory => Arc::new(MemoryChatHistory::new()),
            HistoryBackend::Store => {
                Arc::new(StoreChatHistory::new(store.chat_history().clone()))
            }
        };
        let settings = ChatSettings {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_messages: config.chat.max_messages,
        };
        
        Self {
            recommendations: RecommendationEngine::new(store.clone(), config.recommend.strategy),
            chat: ChatSessionManager::new(chat_client, sessions.clone(), history, settings),
            sessions,
            store,
            config: Arc::new(config),
        }
    }
    
    /// Regenerate the chat inventory prompt from the current catalog.
    /// Failures are logged; the previous prompt stays in place.
    pub async fn refresh_inventory(&self) {
        match self.store.catalog().list_products().await {
            Ok(products) => self.chat.refresh_inventory(&products).await,
            Err(e) => tracing::warn!(error = %e, "Failed to refresh chat inventory"),
        }
    }
}
