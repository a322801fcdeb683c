pub mod product;
pub mod category;
pub mod label;
pub mod recommendation;
pub mod interaction;
pub mod chat;

pub use product::{Product, ProductCreate, ProductLabelRow, ProductRow, ProductSpecRow, ProductUpdate};
pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use label::LabelRow;
pub use recommendation::{ProductRecommendation, RankedRecommendation, RecommendationType};
pub use interaction::{UserPurchaseRow, UserViewRow};
pub use chat::ChatHistoryEntry;
