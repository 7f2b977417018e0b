use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{FilterOptions, Product},
    routes::AppState,
};

/// Lists the skin types and categories present in the catalog
pub async fn filters(State(state): State<Arc<AppState>>) -> Json<FilterOptions> {
    Json(FilterOptions {
        skin_types: state.recommender.skin_type_options(),
        categories: state.recommender.category_options(),
    })
}

/// Fetches a single product by catalog id
pub async fn product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<usize>,
) -> AppResult<Json<Product>> {
    state
        .recommender
        .product(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
}
