use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState, RecommendationsResponse};
use crate::api::auth::CurrentUser;

/// GET /recommendations
///
/// Always answers with a list when the data layer is reachable; AI problems
/// never surface here.
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let recommendations = state
        .recommender
        .recommend(user.id)
        .await
        .map_err(|e| ApiError::RecommendationFailed(e.to_string()))?;

    Ok(Json(RecommendationsResponse { recommendations }))
}
