use tracing::debug;

use storefront_store::{ProductRecommendation, RecommendationRepository, RecommendationType, Result};

use crate::strategy::ScoringStrategy;

/// Maps scores to tiers and persists one row per product
#[derive(Clone)]
pub struct RecommendationClassifier {
    repository: RecommendationRepository,
}

impl RecommendationClassifier {
    pub fn new(repository: RecommendationRepository) -> Self {
        Self { repository }
    }

    pub async fn classify_and_store(
        &self,
        strategy: &dyn ScoringStrategy,
        product_id: i64,
        score: f64,
    ) -> Result<ProductRecommendation> {
        let tier = strategy.classify(score);
        self.store(product_id, tier, score).await
    }

    /// Last writer wins; repeated calls never add rows
    pub async fn store(
        &self,
        product_id: i64,
        tier: RecommendationType,
        score: f64,
    ) -> Result<ProductRecommendation> {
        debug!(product_id, tier = %tier, score, "Storing recommendation");
        self.repository.upsert(product_id, tier, score).await
    }
}
