use std::sync::Arc;

use crate::client::StoreClient;
use crate::dbs::MemoryTableStore;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Memory,
    MongoDb { uri: String, database: String },
}

pub struct StoreClientBuilder {
    backend: Option<StoreBackend>,
}

impl StoreClientBuilder {
    pub fn new() -> Self {
        Self { backend: None }
    }

    pub fn backend(mut self, backend: StoreBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn memory(self) -> Self {
        self.backend(StoreBackend::Memory)
    }

    pub fn mongodb(self, uri: impl Into<String>, database: impl Into<String>) -> Self {
        self.backend(StoreBackend::MongoDb { uri: uri.into(), database: database.into() })
    }

    pub async fn build(self) -> Result<StoreClient> {
        let backend = self
            .backend
            .ok_or_else(|| StoreError::Internal("store backend is required".to_string()))?;

        match backend {
            StoreBackend::Memory => Ok(StoreClient::new(Arc::new(MemoryTableStore::new()))),
            StoreBackend::MongoDb { uri, database } => connect_mongo(&uri, &database).await,
        }
    }
}

impl Default for StoreClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "mongodb")]
async fn connect_mongo(uri: &str, database: &str) -> Result<StoreClient> {
    let store = crate::dbs::MongoTableStore::connect(uri, database).await?;
    tracing::info!(database, "Connected to MongoDB");
    Ok(StoreClient::new(Arc::new(store)))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongo(_uri: &str, _database: &str) -> Result<StoreClient> {
    Err(StoreError::Connection(
        "storefront-store was built without the `mongodb` feature".to_string(),
    ))
}
