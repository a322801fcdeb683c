use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::stream,
    middleware::logging,
    routes::{categories, chat, health, products, recommendations},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Products
        .route("/products", get(products::list_products).post(products::create_product))
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/category/:category_id", get(products::products_by_category))
        .route("/products/label/:label", get(products::products_by_label))
        // Categories
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Recommendations
        .route("/recommendations", get(recommendations::list_recommendations))
        .route("/recommendations/generate/:user_id", post(recommendations::generate_for_user))
        .route("/recommendations/refresh", post(recommendations::refresh_catalog))
        .route(
            "/recommendations/track/view/:user_id/:product_id",
            post(recommendations::track_view),
        )
        .route(
            "/recommendations/track/purchase/:user_id/:product_id",
            post(recommendations::track_purchase),
        )
        .route("/recommendations/user/:user_id", get(recommendations::user_recommendations))
        .route(
            "/recommendations/product/:product_id",
            get(recommendations::product_recommendation)
                .put(recommendations::put_product_recommendation),
        )
        .route("/recommendations/type/:tier", get(recommendations::recommendations_by_type))
        // Chat
        .route("/chat/send", post(chat::send_message))
        .route("/chat/history", get(chat::chat_history))
        .route("/chat/stream", post(stream::send_message_stream))
        .route("/chat/ws/:client_id", get(stream::chat_socket));
    
    let timeout = Duration::from_secs(state.config.server.timeout_secs);
    
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);
        
        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            let origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            cors = cors.allow_origin(origins);
        }
        
        cors
    } else {
        CorsLayer::permissive()
    }
}
