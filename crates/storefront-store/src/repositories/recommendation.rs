use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::models::{ProductRecommendation, ProductRow, RankedRecommendation, RecommendationType};
use crate::table::{from_row, from_rows, tables, Filter, TableStore};

#[derive(Clone)]
pub struct RecommendationRepository {
    store: Arc<dyn TableStore>,
}

impl RecommendationRepository {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Write the tier for a product, replacing any previous row
    pub async fn upsert(
        &self,
        product_id: i64,
        recommendation_type: RecommendationType,
        score: f64,
    ) -> Result<ProductRecommendation> {
        let row = json!({
            "product_id": product_id,
            "recommendation_type": recommendation_type,
            "score": score,
            "updated_at": Utc::now(),
        });
        let row = row.as_object().cloned().unwrap_or_default();

        self.store
            .upsert(tables::PRODUCT_RECOMMENDATIONS, vec![row], &["product_id"])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::write_failed(tables::PRODUCT_RECOMMENDATIONS, "upsert"))
            .and_then(from_row)
    }

    pub async fn get(&self, product_id: i64) -> Result<Option<ProductRecommendation>> {
        self.store
            .select(
                tables::PRODUCT_RECOMMENDATIONS,
                &Filter::all().eq("product_id", product_id).limit(1),
            )
            .await?
            .into_iter()
            .next()
            .map(from_row)
            .transpose()
    }

    /// All rows, highest score first
    pub async fn list(&self) -> Result<Vec<ProductRecommendation>> {
        from_rows(
            self.store
                .select(tables::PRODUCT_RECOMMENDATIONS, &Filter::all().order("score", true))
                .await?,
        )
    }

    pub async fn by_type(&self, tier: RecommendationType) -> Result<Vec<ProductRecommendation>> {
        let filter = Filter::all()
            .eq("recommendation_type", tier.as_str())
            .order("score", true);
        from_rows(self.store.select(tables::PRODUCT_RECOMMENDATIONS, &filter).await?)
    }

    /// All rows joined with product names, highest score first
    pub async fn ranked(&self) -> Result<Vec<RankedRecommendation>> {
        let recommendations = self.list().await?;
        if recommendations.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = recommendations.iter().map(|r| r.product_id).collect();
        let products: Vec<ProductRow> = from_rows(
            self.store
                .select(tables::PRODUCTS, &Filter::all().in_("id", ids))
                .await?,
        )?;
        let names: HashMap<i64, String> = products.into_iter().map(|p| (p.id, p.name)).collect();

        Ok(recommendations
            .into_iter()
            .map(|r| RankedRecommendation {
                product_name: names.get(&r.product_id).cloned(),
                product_id: r.product_id,
                recommendation_type: r.recommendation_type,
                score: r.score,
                updated_at: r.updated_at,
            })
            .collect())
    }
}
