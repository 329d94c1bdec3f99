use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, CatalogListResponse};
use crate::db::CatalogQuery;
use crate::models::catalog::CatalogEntry;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 8;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /animes (public)
pub async fn list_anime(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<CatalogListResponse>, ApiError> {
    let query = CatalogQuery {
        search: params.search,
        genre: params.genre,
        sort_by_score: params.sort.as_deref() == Some("score"),
        page: params.page.unwrap_or(DEFAULT_PAGE),
        limit: params.limit.unwrap_or(DEFAULT_LIMIT),
    };

    let page = state.store.catalog_page(&query).await?;

    Ok(Json(CatalogListResponse::from(page)))
}

/// GET /animes/:id (public)
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<CatalogEntry>, ApiError> {
    let entry = state
        .store
        .get_catalog_entry(id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(entry))
}
