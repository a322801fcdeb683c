use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront_store::{
    Product, ProductRecommendation, RankedRecommendation, RecommendationType, Result, StoreClient,
    StoreError,
};
use storefront_store::models::{UserPurchaseRow, UserViewRow};

use crate::classifier::RecommendationClassifier;
use crate::preferences::{PreferenceExtractor, PreferenceProfile};
use crate::strategy::{ScoringStrategy, StrategyKind, TierThresholds};

/// Outcome of one scoring pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub strategy: StrategyKind,
    pub scored: usize,
    pub highly_recommended: usize,
    pub recommended: usize,
    pub not_recommended: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<PreferenceProfile>,
}

impl GenerationSummary {
    fn new(user_id: Option<i64>, strategy: StrategyKind, profile: Option<PreferenceProfile>) -> Self {
        Self {
            user_id,
            strategy,
            scored: 0,
            highly_recommended: 0,
            recommended: 0,
            not_recommended: 0,
            profile,
        }
    }

    fn count(&mut self, tier: RecommendationType) {
        self.scored += 1;
        match tier {
            RecommendationType::HighlyRecommended => self.highly_recommended += 1,
            RecommendationType::Recommended => self.recommended += 1,
            RecommendationType::NotRecommended => self.not_recommended += 1,
        }
    }
}

/// Product ids grouped by stored score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecommendations {
    pub highly_recommended: Vec<i64>,
    pub recommended: Vec<i64>,
    pub not_recommended: Vec<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Orchestrates preference extraction, scoring and classification
#[derive(Clone)]
pub struct RecommendationEngine {
    store: StoreClient,
    extractor: PreferenceExtractor,
    classifier: RecommendationClassifier,
    default_strategy: StrategyKind,
}

impl RecommendationEngine {
    pub fn new(store: StoreClient, default_strategy: StrategyKind) -> Self {
        Self {
            extractor: PreferenceExtractor::new(
                store.catalog().clone(),
                store.interactions().clone(),
            ),
            classifier: RecommendationClassifier::new(store.recommendations().clone()),
            default_strategy,
            store,
        }
    }

    pub fn default_strategy(&self) -> StrategyKind {
        self.default_strategy
    }

    /// Score every catalog product against the user's profile
    pub async fn generate_for_user(
        &self,
        user_id: i64,
        strategy: Option<StrategyKind>,
    ) -> Result<GenerationSummary> {
        let kind = strategy.unwrap_or(self.default_strategy);
        let profile = self.extractor.extract(user_id).await?;
        let products = self.store.catalog().list_products().await?;

        let strategy = kind.build();
        let mut summary = GenerationSummary::new(Some(user_id), kind, Some(profile.clone()));
        self.score_all(strategy.as_ref(), &profile, &products, &mut summary)
            .await?;

        info!(
            user_id,
            strategy = %kind,
            scored = summary.scored,
            highly = summary.highly_recommended,
            "Generated recommendations"
        );
        Ok(summary)
    }

    /// User-independent pass over the whole catalog
    pub async fn refresh_catalog(&self, strategy: Option<StrategyKind>) -> Result<GenerationSummary> {
        let kind = strategy.unwrap_or(self.default_strategy);
        let products = self.store.catalog().list_products().await?;

        let strategy = kind.build();
        let mut summary = GenerationSummary::new(None, kind, None);
        self.score_all(strategy.as_ref(), &PreferenceProfile::default(), &products, &mut summary)
            .await?;

        info!(strategy = %kind, scored = summary.scored, "Refreshed catalog recommendations");
        Ok(summary)
    }

    async fn score_all(
        &self,
        strategy: &dyn ScoringStrategy,
        profile: &PreferenceProfile,
        products: &[Product],
        summary: &mut GenerationSummary,
    ) -> Result<()> {
        for product in products {
            let score = strategy.score(profile, product);
            let stored = self
                .classifier
                .classify_and_store(strategy, product.id, score)
                .await?;
            summary.count(stored.recommendation_type);
        }
        Ok(())
    }

    pub async fn ranked(&self) -> Result<Vec<RankedRecommendation>> {
        self.store.recommendations().ranked().await
    }

    pub async fn by_type(&self, tier: RecommendationType) -> Result<Vec<ProductRecommendation>> {
        self.store.recommendations().by_type(tier).await
    }

    pub async fn for_product(&self, product_id: i64) -> Result<ProductRecommendation> {
        self.store
            .recommendations()
            .get(product_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Recommendation", product_id))
    }

    /// Stored rows grouped with the normalized thresholds, highest score first
    pub async fn for_user(&self, user_id: i64) -> Result<UserRecommendations> {
        let rows = self.store.recommendations().list().await?;
        let thresholds = TierThresholds::NORMALIZED;

        let mut grouped = UserRecommendations {
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        for row in rows {
            match thresholds.classify(row.score) {
                RecommendationType::HighlyRecommended => grouped.highly_recommended.push(row.product_id),
                RecommendationType::Recommended => grouped.recommended.push(row.product_id),
                RecommendationType::NotRecommended => grouped.not_recommended.push(row.product_id),
            }
        }

        tracing::debug!(user_id, "Grouped stored recommendations");
        Ok(grouped)
    }

    /// Manual override of one product's tier and score
    pub async fn put(
        &self,
        product_id: i64,
        tier: RecommendationType,
        score: f64,
    ) -> Result<ProductRecommendation> {
        if !score.is_finite() || score < 0.0 {
            return Err(StoreError::Validation(format!(
                "score must be a non-negative number, got {score}"
            )));
        }
        self.store.catalog().get_product(product_id).await?;
        self.classifier.store(product_id, tier, score).await
    }

    pub async fn track_view(&self, user_id: i64, product_id: i64) -> Result<UserViewRow> {
        self.store.interactions().track_view(user_id, product_id).await
    }

    pub async fn track_purchase(&self, user_id: i64, product_id: i64) -> Result<UserPurchaseRow> {
        self.store.interactions().track_purchase(user_id, product_id).await
    }

    pub async fn profile(&self, user_id: i64) -> Result<PreferenceProfile> {
        self.extractor.extract(user_id).await
    }
}
