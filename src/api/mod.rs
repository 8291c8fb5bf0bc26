use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::search_client::WbSearchClient;

pub mod handlers;
pub mod models;

pub struct AppState {
    pub client: WbSearchClient,
    /// Upper bound on one search; in-flight page requests are dropped when it fires.
    pub search_timeout: Duration,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/rank", post(handlers::rank_handler))
        .route("/api/health", get(handlers::health_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
