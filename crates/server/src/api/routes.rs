use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{handlers, jackett};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes behind the API key guard
    let protected = Router::new()
        .route("/config", get(handlers::get_config))
        // Jackett custom indexer configs
        .route(
            "/jackett/list_custom_configs",
            get(jackett::list_custom_configs),
        )
        .route("/jackett/indexers", get(jackett::list_indexers))
        .route("/jackett/status", get(jackett::get_status))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
