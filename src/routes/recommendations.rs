use axum::{extract::State, response::IntoResponse, Extension, Json};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
    services::history,
};

/// Handler for recommendations endpoint
///
/// Recording to history is best effort: the recommendations are returned
/// whether or not the store accepted them.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(user) = &request.user {
        user.validate()?;
    }

    let top_n = request.top_n.unwrap_or(state.default_top_n);
    let skin_types: HashSet<String> = request.skin_types.iter().cloned().collect();
    let categories: HashSet<String> = request.categories.iter().cloned().collect();

    tracing::info!(
        request_id = %request_id,
        skin_types = ?request.skin_types,
        categories = ?request.categories,
        top_n,
        "Processing recommendation request"
    );

    let recommendations = state.recommender.recommend(
        &skin_types,
        &categories,
        usize::try_from(top_n).unwrap_or(0),
    );

    let history_id = match (&state.history, &request.user) {
        (Some(store), Some(user)) if !recommendations.is_empty() => {
            history::record_recommendations(
                store.as_ref(),
                user,
                &request.skin_types,
                &request.categories,
                &recommendations,
            )
            .await
        }
        _ => None,
    };

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        history_id = ?history_id,
        "Recommendations served"
    );

    let response = RecommendationResponse {
        count: recommendations.len(),
        recommendations,
        history_id,
    };

    Ok(Json(response).into_response())
}
