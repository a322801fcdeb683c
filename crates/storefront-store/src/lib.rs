pub mod table;
pub mod models;
pub mod repositories;
pub mod dbs;
pub mod client;
pub mod error;
pub mod builder;

pub use table::{tables, Filter, Row, TableStore};
pub use models::{
    Category, CategoryCreate, CategoryUpdate, ChatHistoryEntry, Product, ProductCreate,
    ProductRecommendation, ProductUpdate, RankedRecommendation, RecommendationType,
};
pub use repositories::{
    CatalogRepository, ChatHistoryRepository, InteractionRepository, RecommendationRepository,
};
pub use dbs::MemoryTableStore;
#[cfg(feature = "mongodb")]
pub use dbs::MongoTableStore;
pub use client::StoreClient;
pub use error::{Result, StoreError};
pub use builder::{StoreBackend, StoreClientBuilder};
