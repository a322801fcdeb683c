use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

use storefront_store::{CatalogRepository, InteractionRepository, Product, Result};

/// Derived, never persisted. Rebuilt on every generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreferenceProfile {
    pub preferred_categories: Vec<i64>,
    pub preferred_labels: Vec<String>,
    pub price_range: Option<(f64, f64)>,
    pub preferred_specs: HashMap<String, String>,
}

const TOP_CATEGORIES: usize = 2;
const TOP_LABELS: usize = 3;
const SINGLE_PRICE_SPREAD: f64 = 0.2;

impl PreferenceProfile {
    pub fn is_empty(&self) -> bool {
        self.preferred_categories.is_empty()
            && self.preferred_labels.is_empty()
            && self.price_range.is_none()
            && self.preferred_specs.is_empty()
    }

    /// Fold interacted products into a profile.
    ///
    /// Ties in every top-N selection keep first-seen order.
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut categories = Tally::default();
        let mut labels = Tally::default();
        let mut specs: HashMap<&str, Tally<&str>> = HashMap::new();
        let mut spec_keys: Vec<&str> = Vec::new();
        let mut prices = Vec::new();

        for product in products {
            if let Some(category) = product.category_id {
                categories.add(category);
            }
            for label in &product.labels {
                labels.add(label.as_str());
            }
            let mut entries: Vec<(&String, &String)> = product.specs.iter().collect();
            entries.sort();
            for (key, value) in entries {
                if !specs.contains_key(key.as_str()) {
                    spec_keys.push(key.as_str());
                }
                specs.entry(key.as_str()).or_default().add(value.as_str());
            }
            prices.push(product.price);
        }

        let preferred_specs = spec_keys
            .into_iter()
            .filter_map(|key| {
                let value = specs.get(key)?.top(1).into_iter().next()?;
                Some((key.to_string(), value.to_string()))
            })
            .collect();

        Self {
            preferred_categories: categories.top(TOP_CATEGORIES),
            preferred_labels: labels.top(TOP_LABELS).into_iter().map(str::to_string).collect(),
            price_range: price_range(&prices),
            preferred_specs,
        }
    }
}

/// Mean plus or minus the population standard deviation, lower bound clamped at zero
fn price_range(prices: &[f64]) -> Option<(f64, f64)> {
    let n = prices.len();
    if n == 0 {
        return None;
    }
    let mean = prices.iter().sum::<f64>() / n as f64;
    let spread = if n == 1 {
        mean * SINGLE_PRICE_SPREAD
    } else {
        let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n as f64;
        variance.sqrt()
    };
    Some(((mean - spread).max(0.0), mean + spread))
}

/// Occurrence counter that remembers first-seen order
struct Tally<T> {
    order: Vec<T>,
    counts: HashMap<T, usize>,
}

impl<T> Default for Tally<T> {
    fn default() -> Self {
        Self { order: Vec::new(), counts: HashMap::new() }
    }
}

impl<T: Copy + Eq + Hash> Tally<T> {
    fn add(&mut self, item: T) {
        let count = self.counts.entry(item).or_insert(0);
        if *count == 0 {
            self.order.push(item);
        }
        *count += 1;
    }

    fn top(&self, n: usize) -> Vec<T> {
        let mut ranked: Vec<(usize, T)> = self
            .order
            .iter()
            .map(|item| (self.counts.get(item).copied().unwrap_or(0), *item))
            .collect();
        // stable sort keeps first-seen order among equal counts
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        ranked.into_iter().take(n).map(|(_, item)| item).collect()
    }
}

/// Builds a user's profile from their purchases and views
#[derive(Clone)]
pub struct PreferenceExtractor {
    catalog: CatalogRepository,
    interactions: InteractionRepository,
}

impl PreferenceExtractor {
    pub fn new(catalog: CatalogRepository, interactions: InteractionRepository) -> Self {
        Self { catalog, interactions }
    }

    pub async fn extract(&self, user_id: i64) -> Result<PreferenceProfile> {
        let ids = self.interactions.interacted_product_ids(user_id).await?;
        if ids.is_empty() {
            return Ok(PreferenceProfile::default());
        }

        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        let catalog: HashMap<i64, Product> = self
            .catalog
            .products_by_ids(&unique)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // products deleted since the interaction are skipped
        let interacted: Vec<&Product> = ids.iter().filter_map(|id| catalog.get(id)).collect();
        debug!(
            user_id,
            events = ids.len(),
            products = interacted.len(),
            "Extracting preference profile"
        );
        Ok(PreferenceProfile::from_products(interacted))
    }
}
