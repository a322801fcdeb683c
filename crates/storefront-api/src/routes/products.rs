use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use storefront_store::{Product, ProductCreate, ProductUpdate};
use crate::{error::ApiResult, state::AppState};

pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.store.catalog().list_products().await?))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductCreate>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.store.catalog().create_product(req).await?;
    state.refresh_inventory().await;
    
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.store.catalog().get_product(product_id).await?))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Json(req): Json<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    let product = state.store.catalog().update_product(product_id, req).await?;
    state.refresh_inventory().await;
    
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.catalog().delete_product(product_id).await?;
    state.refresh_inventory().await;
    
    Ok(StatusCode::NO_CONTENT)
}

pub async fn products_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.store.catalog().products_by_category(category_id).await?))
}

pub async fn products_by_label(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.store.catalog().products_by_label(&label).await?))
}
