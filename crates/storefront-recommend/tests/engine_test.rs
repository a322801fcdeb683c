use std::collections::HashMap;

use storefront_recommend::{RecommendationEngine, StrategyKind};
use storefront_store::{CategoryCreate, ProductCreate, RecommendationType, StoreClient, StoreError};

fn payload(name: &str, category_id: Option<i64>, labels: &[&str], price: f64) -> ProductCreate {
    ProductCreate {
        name: name.to_string(),
        price,
        description: None,
        stock: 3,
        category_id,
        image_url: None,
        rating: None,
        specs: HashMap::new(),
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

async fn seeded() -> (StoreClient, i64) {
    let store = StoreClient::in_memory();
    let phones = store
        .catalog()
        .create_category(CategoryCreate { name: "phones".to_string(), description: None })
        .await
        .unwrap();
    (store, phones.id)
}

#[tokio::test]
async fn test_phone_viewer_gets_highly_recommended_phone() {
    let (store, phones) = seeded().await;
    let viewed = store
        .catalog()
        .create_product(payload("Viewed", Some(phones), &["mobile"], 800.0))
        .await
        .unwrap();
    let candidate = store
        .catalog()
        .create_product(payload("P", Some(phones), &["mobile"], 800.0))
        .await
        .unwrap();
    store.interactions().track_view(1, viewed.id).await.unwrap();

    let engine = RecommendationEngine::new(store.clone(), StrategyKind::Content);
    let summary = engine.generate_for_user(1, None).await.unwrap();

    let profile = summary.profile.clone().unwrap();
    assert_eq!(profile.preferred_categories, vec![phones]);
    assert_eq!(profile.preferred_labels, vec!["mobile".to_string()]);
    let (low, high) = profile.price_range.unwrap();
    assert!((low - 640.0).abs() < 1e-9 && (high - 960.0).abs() < 1e-9);

    let stored = engine.for_product(candidate.id).await.unwrap();
    assert!((stored.score - 0.7).abs() < 1e-9);
    assert_eq!(stored.recommendation_type, RecommendationType::HighlyRecommended);
    assert_eq!(summary.scored, 2);
}

#[tokio::test]
async fn test_user_without_history_scores_zero() {
    let (store, phones) = seeded().await;
    store
        .catalog()
        .create_product(payload("P", Some(phones), &["mobile"], 800.0))
        .await
        .unwrap();

    let engine = RecommendationEngine::new(store, StrategyKind::Content);
    let summary = engine.generate_for_user(99, None).await.unwrap();

    assert!(summary.profile.unwrap().price_range.is_none());
    assert_eq!(summary.not_recommended, 1);
    let rows = engine.by_type(RecommendationType::NotRecommended).await.unwrap();
    assert_eq!(rows[0].score, 0.0);
}

#[tokio::test]
async fn test_deleted_products_are_skipped_in_profile() {
    let (store, phones) = seeded().await;
    let gone = store
        .catalog()
        .create_product(payload("Gone", Some(phones), &["mobile"], 100.0))
        .await
        .unwrap();
    store.interactions().track_purchase(5, gone.id).await.unwrap();
    store.catalog().delete_product(gone.id).await.unwrap();

    let engine = RecommendationEngine::new(store, StrategyKind::Content);
    assert!(engine.profile(5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_regeneration_keeps_one_row_per_product() {
    let (store, phones) = seeded().await;
    store
        .catalog()
        .create_product(payload("P", Some(phones), &[], 10.0))
        .await
        .unwrap();
    let engine = RecommendationEngine::new(store, StrategyKind::Content);

    engine.generate_for_user(1, None).await.unwrap();
    let first = engine.ranked().await.unwrap();
    engine.generate_for_user(1, None).await.unwrap();
    let second = engine.ranked().await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(second[0].updated_at >= first[0].updated_at);
}

#[tokio::test]
async fn test_feature_mean_uses_raw_thresholds() {
    let store = StoreClient::in_memory();
    let pricey = store
        .catalog()
        .create_product(payload("Pricey", None, &[], 1200.0))
        .await
        .unwrap();
    let cheap = store
        .catalog()
        .create_product(payload("Cheap", None, &[], 6.0))
        .await
        .unwrap();

    let engine = RecommendationEngine::new(store, StrategyKind::Content);
    let summary = engine.refresh_catalog(Some(StrategyKind::FeatureMean)).await.unwrap();
    assert_eq!(summary.strategy, StrategyKind::FeatureMean);

    assert_eq!(
        engine.for_product(pricey.id).await.unwrap().recommendation_type,
        RecommendationType::HighlyRecommended
    );
    assert_eq!(
        engine.for_product(cheap.id).await.unwrap().recommendation_type,
        RecommendationType::NotRecommended
    );
}

#[tokio::test]
async fn test_grouped_view_and_override() {
    let store = StoreClient::in_memory();
    let a = store.catalog().create_product(payload("A", None, &[], 1.0)).await.unwrap();
    let b = store.catalog().create_product(payload("B", None, &[], 1.0)).await.unwrap();
    let engine = RecommendationEngine::new(store, StrategyKind::Content);

    engine.put(a.id, RecommendationType::HighlyRecommended, 0.9).await.unwrap();
    engine.put(b.id, RecommendationType::Recommended, 0.4).await.unwrap();

    let grouped = engine.for_user(1).await.unwrap();
    assert_eq!(grouped.highly_recommended, vec![a.id]);
    assert_eq!(grouped.recommended, vec![b.id]);
    assert!(grouped.not_recommended.is_empty());

    let err = engine.put(999, RecommendationType::Recommended, 0.5).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    let err = engine.put(a.id, RecommendationType::Recommended, -1.0).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}
