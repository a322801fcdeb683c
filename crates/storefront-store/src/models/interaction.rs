use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserViewRow {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub viewed_at: DateTime<Utc>,
    #[serde(default = "one")]
    pub view_count: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPurchaseRow {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub purchased_at: DateTime<Utc>,
}
