use storefront_store::Product;

use crate::preferences::PreferenceProfile;
use crate::strategy::{ScoringStrategy, TierThresholds};

const CATEGORY_MATCH: f64 = 0.3;
const LABEL_MATCH: f64 = 0.2;
const PRICE_MATCH: f64 = 0.2;
const SPEC_MATCH: f64 = 0.1;

/// Additive profile similarity, clamped to 1.0 once at the end.
///
/// An empty profile contributes nothing and scores 0.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentScorer;

impl ScoringStrategy for ContentScorer {
    fn name(&self) -> &'static str {
        "content"
    }

    fn thresholds(&self) -> TierThresholds {
        TierThresholds::NORMALIZED
    }

    fn score(&self, profile: &PreferenceProfile, product: &Product) -> f64 {
        let mut score = 0.0;

        if product
            .category_id
            .is_some_and(|category| profile.preferred_categories.contains(&category))
        {
            score += CATEGORY_MATCH;
        }

        let shared_labels = product
            .labels
            .iter()
            .filter(|label| profile.preferred_labels.contains(*label))
            .count();
        score += LABEL_MATCH * shared_labels as f64;

        if let Some((low, high)) = profile.price_range {
            if low <= product.price && product.price <= high {
                score += PRICE_MATCH;
            }
        }

        let matching_specs = product
            .specs
            .iter()
            .filter(|(key, value)| profile.preferred_specs.get(*key) == Some(*value))
            .count();
        score += SPEC_MATCH * matching_specs as f64;

        score.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn product(labels: &[&str], specs: &[(&str, &str)]) -> Product {
        Product {
            id: 1,
            name: "P".to_string(),
            price: 800.0,
            description: String::new(),
            stock: 1,
            category_id: Some(1),
            image_url: None,
            rating: None,
            specs: specs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let score = ContentScorer.score(&PreferenceProfile::default(), &product(&["mobile"], &[]));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_clamped_once_at_the_end() {
        let profile = PreferenceProfile {
            preferred_categories: vec![1],
            preferred_labels: vec!["a".into(), "b".into(), "c".into()],
            price_range: Some((700.0, 900.0)),
            preferred_specs: HashMap::from([("color".to_string(), "red".to_string())]),
        };
        let p = product(&["a", "b", "c"], &[("color", "red")]);
        assert_eq!(ContentScorer.score(&profile, &p), 1.0);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let profile = PreferenceProfile {
            price_range: Some((800.0, 800.0)),
            ..Default::default()
        };
        assert!((ContentScorer.score(&profile, &product(&[], &[])) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let profile = PreferenceProfile {
            preferred_categories: vec![1, 2],
            preferred_labels: vec!["a".into(), "b".into()],
            price_range: Some((0.0, 1000.0)),
            preferred_specs: HashMap::from([
                ("k1".to_string(), "v".to_string()),
                ("k2".to_string(), "v".to_string()),
            ]),
        };
        let label_sets: [&[&str]; 3] = [&[], &["a"], &["a", "b", "z"]];
        for labels in label_sets {
            for specs in [&[][..], &[("k1", "v")][..], &[("k1", "v"), ("k2", "v")][..]] {
                let score = ContentScorer.score(&profile, &product(labels, specs));
                assert!((0.0..=1.0).contains(&score), "score {score} out of range");
            }
        }
    }
}
