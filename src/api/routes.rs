//! HTTP API route definitions.

use axum::{http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::market::MarketSource;

use super::handlers::{
    change_page, health, index, markets, metrics, ready, select_currency, select_order, source,
    AppState,
};

/// Create the dashboard router.
pub fn create_router<S: MarketSource>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        // Dashboard
        .route("/", get(index::<S>))
        .route("/table/currency", get(select_currency::<S>))
        .route("/table/order", get(select_order::<S>))
        .route("/table/page", get(change_page::<S>))
        .route("/source", get(source::<S>))
        // JSON snapshot
        .route("/api/v1/markets", get(markets::<S>).layer(cors))
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready::<S>))
        .route("/metrics", get(metrics::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
