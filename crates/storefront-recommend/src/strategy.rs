use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use storefront_store::{Product, RecommendationType, StoreError};

use crate::content::ContentScorer;
use crate::feature_mean::FeatureMeanScorer;
use crate::preferences::PreferenceProfile;

/// Closed-open tier boundaries: `score >= highly` is highly recommended,
/// `recommended <= score < highly` is recommended, anything lower is not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    pub highly: f64,
    pub recommended: f64,
}

impl TierThresholds {
    pub const NORMALIZED: TierThresholds = TierThresholds { highly: 0.7, recommended: 0.4 };
    pub const RAW_FEATURE_MEAN: TierThresholds = TierThresholds { highly: 150.0, recommended: 50.0 };

    pub fn classify(&self, score: f64) -> RecommendationType {
        if score >= self.highly {
            RecommendationType::HighlyRecommended
        } else if score >= self.recommended {
            RecommendationType::Recommended
        } else {
            RecommendationType::NotRecommended
        }
    }
}

/// Scores a product against a user's preference profile
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn thresholds(&self) -> TierThresholds;

    fn score(&self, profile: &PreferenceProfile, product: &Product) -> f64;

    fn classify(&self, score: f64) -> RecommendationType {
        self.thresholds().classify(score)
    }
}

/// Named, independently selectable scoring schemes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Content,
    FeatureMean,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::FeatureMean => "feature_mean",
        }
    }

    pub fn build(&self) -> Arc<dyn ScoringStrategy> {
        match self {
            Self::Content => Arc::new(ContentScorer),
            Self::FeatureMean => Arc::new(FeatureMeanScorer),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Self::Content),
            "feature_mean" => Ok(Self::FeatureMean),
            other => Err(StoreError::Validation(format!("unknown scoring strategy: {other}"))),
        }
    }
}
