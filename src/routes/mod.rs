use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{HistoryStore, Recommender},
};

pub mod catalog;
pub mod recommendations;

/// Shared, read-only application state
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub history: Option<Arc<dyn HistoryStore>>,
    pub default_top_n: i64,
}

impl AppState {
    pub fn new(recommender: Recommender, default_top_n: i64) -> Self {
        Self {
            recommender: Arc::new(recommender),
            history: None,
            default_top_n,
        }
    }

    /// Enables recording of served recommendations
    pub fn with_history(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(store);
        self
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/filters", get(catalog::filters))
        .route("/products/:id", get(catalog::product))
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
