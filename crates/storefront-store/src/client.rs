use std::sync::Arc;

use crate::dbs::MemoryTableStore;
use crate::error::Result;
use crate::repositories::{
    CatalogRepository, ChatHistoryRepository, InteractionRepository, RecommendationRepository,
};
use crate::table::TableStore;

/// Bundles the repositories that share one table store
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn TableStore>,
    catalog: CatalogRepository,
    interactions: InteractionRepository,
    recommendations: RecommendationRepository,
    chat_history: ChatHistoryRepository,
}

impl StoreClient {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            catalog: CatalogRepository::new(store.clone()),
            interactions: InteractionRepository::new(store.clone()),
            recommendations: RecommendationRepository::new(store.clone()),
            chat_history: ChatHistoryRepository::new(store.clone()),
            store,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTableStore::new()))
    }

    pub fn catalog(&self) -> &CatalogRepository {
        &self.catalog
    }

    pub fn interactions(&self) -> &InteractionRepository {
        &self.interactions
    }

    pub fn recommendations(&self) -> &RecommendationRepository {
        &self.recommendations
    }

    pub fn chat_history(&self) -> &ChatHistoryRepository {
        &self.chat_history
    }

    pub fn table_store(&self) -> Arc<dyn TableStore> {
        self.store.clone()
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await
    }
}
