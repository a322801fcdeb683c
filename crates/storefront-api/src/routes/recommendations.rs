use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use storefront_recommend::{GenerationSummary, StrategyKind, UserRecommendations};
use storefront_store::{ProductRecommendation, RankedRecommendation, RecommendationType};
use storefront_store::models::{UserPurchaseRow, UserViewRow};
use crate::{error::{ApiError, ApiResult}, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StrategyQuery {
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationListResponse {
    pub recommendations: Vec<RankedRecommendation>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationOverride {
    pub recommendation_type: RecommendationType,
    pub score: f64,
}

pub async fn list_recommendations(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RecommendationListResponse>> {
    let recommendations = state.recommendations.ranked().await?;
    Ok(Json(RecommendationListResponse { recommendations }))
}

pub async fn generate_for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(query): Query<StrategyQuery>,
) -> ApiResult<Json<GenerationSummary>> {
    let summary = state
        .recommendations
        .generate_for_user(user_id, query.strategy)
        .await?;
    Ok(Json(summary))
}

pub async fn refresh_catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StrategyQuery>,
) -> ApiResult<Json<GenerationSummary>> {
    Ok(Json(state.recommendations.refresh_catalog(query.strategy).await?))
}

pub async fn track_view(
    State(state): State<Arc<AppState>>,
    Path((user_id, product_id)): Path<(i64, i64)>,
) -> ApiResult<Json<UserViewRow>> {
    Ok(Json(state.recommendations.track_view(user_id, product_id).await?))
}

pub async fn track_purchase(
    State(state): State<Arc<AppState>>,
    Path((user_id, product_id)): Path<(i64, i64)>,
) -> ApiResult<Json<UserPurchaseRow>> {
    Ok(Json(state.recommendations.track_purchase(user_id, product_id).await?))
}

pub async fn user_recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserRecommendations>> {
    Ok(Json(state.recommendations.for_user(user_id).await?))
}

pub async fn product_recommendation(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<ProductRecommendation>> {
    Ok(Json(state.recommendations.for_product(product_id).await?))
}

pub async fn put_product_recommendation(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Json(req): Json<RecommendationOverride>,
) -> ApiResult<Json<ProductRecommendation>> {
    let stored = state
        .recommendations
        .put(product_id, req.recommendation_type, req.score)
        .await?;
    Ok(Json(stored))
}

pub async fn recommendations_by_type(
    State(state): State<Arc<AppState>>,
    Path(tier): Path<String>,
) -> ApiResult<Json<Vec<ProductRecommendation>>> {
    let tier: RecommendationType = tier
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown recommendation type: {}", tier)))?;
    Ok(Json(state.recommendations.by_type(tier).await?))
}
