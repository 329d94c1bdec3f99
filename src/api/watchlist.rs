use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    AddToListRequest, ApiError, AppState, MessageResponse, UpdateProgressRequest,
    WatchlistAnimeDetail, WatchlistAnimeSummary, WatchlistDetailDto, WatchlistItemDto,
};
use crate::api::auth::CurrentUser;
use crate::models::watchlist::WatchlistEntry;

/// POST /mylist
pub async fn add_to_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AddToListRequest>,
) -> Result<(StatusCode, Json<WatchlistEntry>), ApiError> {
    // Surface an unknown anime id as a clean 400 instead of a foreign key
    // constraint failure.
    if state
        .store
        .get_catalog_entry(payload.anime_id)
        .await?
        .is_none()
    {
        return Err(ApiError::validation("Unknown anime_id"));
    }

    let entry = state
        .store
        .add_watchlist_entry(user.id, payload.anime_id)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /mylist
pub async fn get_my_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<WatchlistItemDto>>, ApiError> {
    let rows = state.store.list_watchlist(user.id).await?;

    let items = rows
        .into_iter()
        .map(|(entry, anime)| WatchlistItemDto {
            entry,
            anime: anime.map(WatchlistAnimeSummary::from),
        })
        .collect();

    Ok(Json(items))
}

/// GET /mylist/:id
pub async fn get_my_list_by_id(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<WatchlistDetailDto>, ApiError> {
    let (entry, anime) = state
        .store
        .get_watchlist_entry(id, user.id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(WatchlistDetailDto {
        entry,
        anime: anime.map(WatchlistAnimeDetail::from),
    }))
}

/// PUT /mylist/:id
pub async fn update_my_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<Json<WatchlistDetailDto>, ApiError> {
    if payload.progress < 0 {
        return Err(ApiError::validation("Progress cannot be negative"));
    }

    let (entry, anime) = state
        .store
        .update_watchlist_progress(id, user.id, payload.progress)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(WatchlistDetailDto {
        entry,
        anime: anime.map(WatchlistAnimeDetail::from),
    }))
}

/// DELETE /mylist/:id
pub async fn delete_my_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.store.delete_watchlist_entry(id, user.id).await?;

    if !deleted {
        return Err(ApiError::not_found());
    }

    Ok(Json(MessageResponse {
        message: "Successfully deleted".to_string(),
    }))
}
