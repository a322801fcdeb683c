mod preferences;
mod strategy;
mod content;
mod feature_mean;
mod classifier;
mod service;

pub use preferences::{PreferenceExtractor, PreferenceProfile};
pub use strategy::{ScoringStrategy, StrategyKind, TierThresholds};
pub use content::ContentScorer;
pub use feature_mean::FeatureMeanScorer;
pub use classifier::RecommendationClassifier;
pub use service::{GenerationSummary, RecommendationEngine, UserRecommendations};
