use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::{UserPurchaseRow, UserViewRow};
use crate::table::{from_row, from_rows, tables, Filter, TableStore};

/// View and purchase events used as preference signals
#[derive(Clone)]
pub struct InteractionRepository {
    store: Arc<dyn TableStore>,
}

impl InteractionRepository {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Record a view, one row per (user, product) with a running count
    pub async fn track_view(&self, user_id: i64, product_id: i64) -> Result<UserViewRow> {
        self.ensure_product(product_id).await?;

        let key = Filter::all().eq("user_id", user_id).eq("product_id", product_id);
        let previous: Option<UserViewRow> = self
            .store
            .select(tables::USER_VIEWS, &key)
            .await?
            .into_iter()
            .next()
            .map(from_row)
            .transpose()?;
        let view_count = previous.map(|view| view.view_count + 1).unwrap_or(1);

        let row = json!({
            "user_id": user_id,
            "product_id": product_id,
            "viewed_at": Utc::now(),
            "view_count": view_count,
        });
        let stored = self
            .store
            .upsert(tables::USER_VIEWS, vec![object(row)], &["user_id", "product_id"])
            .await?;

        debug!(user_id, product_id, view_count, "Tracked product view");
        stored
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::write_failed(tables::USER_VIEWS, "upsert"))
            .and_then(from_row)
    }

    pub async fn track_purchase(&self, user_id: i64, product_id: i64) -> Result<UserPurchaseRow> {
        self.ensure_product(product_id).await?;

        let row = json!({
            "user_id": user_id,
            "product_id": product_id,
            "purchased_at": Utc::now(),
        });
        let stored = self.store.insert(tables::USER_PURCHASES, vec![object(row)]).await?;

        debug!(user_id, product_id, "Tracked purchase");
        stored
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::write_failed(tables::USER_PURCHASES, "insert"))
            .and_then(from_row)
    }

    /// Purchased then viewed product ids, one entry per event row
    pub async fn interacted_product_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let by_user = Filter::all().eq("user_id", user_id).order("id", false);
        let purchases: Vec<UserPurchaseRow> =
            from_rows(self.store.select(tables::USER_PURCHASES, &by_user).await?)?;
        let views: Vec<UserViewRow> =
            from_rows(self.store.select(tables::USER_VIEWS, &by_user).await?)?;

        Ok(purchases
            .iter()
            .map(|p| p.product_id)
            .chain(views.iter().map(|v| v.product_id))
            .collect())
    }

    async fn ensure_product(&self, product_id: i64) -> Result<()> {
        let found = self
            .store
            .select(tables::PRODUCTS, &Filter::by_id(product_id).limit(1))
            .await?;
        if found.is_empty() {
            return Err(StoreError::not_found("Product", product_id));
        }
        Ok(())
    }
}

fn object(value: serde_json::Value) -> crate::table::Row {
    value.as_object().cloned().unwrap_or_default()
}
