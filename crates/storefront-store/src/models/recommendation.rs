use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Recommendation tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    HighlyRecommended,
    Recommended,
    NotRecommended,
}

impl RecommendationType {
    pub const ALL: [RecommendationType; 3] = [
        RecommendationType::HighlyRecommended,
        RecommendationType::Recommended,
        RecommendationType::NotRecommended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighlyRecommended => "highly_recommended",
            Self::Recommended => "recommended",
            Self::NotRecommended => "not_recommended",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| StoreError::Validation(format!("unknown recommendation type: {s}")))
    }
}

/// One live row per product in `product_recommendations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecommendation {
    pub id: i64,
    pub product_id: i64,
    pub recommendation_type: RecommendationType,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

/// Recommendation joined with its product name for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecommendation {
    pub product_id: i64,
    pub product_name: Option<String>,
    pub recommendation_type: RecommendationType,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_wire_names() {
        assert_eq!(
            serde_json::to_value(RecommendationType::HighlyRecommended).unwrap(),
            serde_json::json!("highly_recommended")
        );
        assert_eq!("not_recommended".parse::<RecommendationType>().unwrap(), RecommendationType::NotRecommended);
        assert!("great".parse::<RecommendationType>().is_err());
    }
}
