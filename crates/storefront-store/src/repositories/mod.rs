pub mod catalog;
pub mod interaction;
pub mod recommendation;
pub mod chat_history;

pub use catalog::{merge_products, CatalogRepository};
pub use interaction::InteractionRepository;
pub use recommendation::RecommendationRepository;
pub use chat_history::ChatHistoryRepository;
