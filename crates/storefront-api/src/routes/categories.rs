use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use storefront_store::{Category, CategoryCreate, CategoryUpdate};
use crate::{error::ApiResult, state::AppState};

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.store.catalog().list_categories().await?))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CategoryCreate>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.store.catalog().create_category(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.store.catalog().get_category(category_id).await?))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
    Json(req): Json<CategoryUpdate>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.store.catalog().update_category(category_id, req).await?))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.catalog().delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
