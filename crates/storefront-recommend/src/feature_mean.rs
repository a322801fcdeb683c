use storefront_store::Product;

use crate::preferences::PreferenceProfile;
use crate::strategy::{ScoringStrategy, TierThresholds};

/// Catalog-wide scheme: the unnormalized mean of a product's raw features.
/// The user profile is not consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureMeanScorer;

impl FeatureMeanScorer {
    /// price, description length, rating, stock, spec count, label count
    pub fn features(product: &Product) -> [f64; 6] {
        [
            product.price,
            product.description.chars().count() as f64,
            product.rating.unwrap_or(0.0),
            product.stock as f64,
            product.specs.len() as f64,
            product.labels.len() as f64,
        ]
    }
}

impl ScoringStrategy for FeatureMeanScorer {
    fn name(&self) -> &'static str {
        "feature_mean"
    }

    fn thresholds(&self) -> TierThresholds {
        TierThresholds::RAW_FEATURE_MEAN
    }

    fn score(&self, _profile: &PreferenceProfile, product: &Product) -> f64 {
        let features = Self::features(product);
        features.iter().sum::<f64>() / features.len() as f64
    }
}
