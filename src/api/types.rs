use serde::{Deserialize, Serialize};

use crate::models::catalog::{CatalogEntry, CatalogPage};
use crate::models::watchlist::WatchlistEntry;
use crate::services::Recommendation;

/// Every error response carries exactly this shape.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogListResponse {
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalData")]
    pub total_data: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    pub data: Vec<CatalogEntry>,
}

impl From<CatalogPage> for CatalogListResponse {
    fn from(page: CatalogPage) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total_data: page.total_data,
            total_pages: page.total_pages,
            data: page.data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToListRequest {
    pub anime_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub progress: i32,
}

/// Catalog summary joined onto each row of the list view.
#[derive(Debug, Serialize)]
pub struct WatchlistAnimeSummary {
    pub title: String,
    pub genres: String,
    pub status: String,
    pub score: f32,
    pub image_url: Option<String>,
}

impl From<CatalogEntry> for WatchlistAnimeSummary {
    fn from(anime: CatalogEntry) -> Self {
        Self {
            title: anime.title,
            genres: anime.genres,
            status: anime.status,
            score: anime.score,
            image_url: anime.image_url,
        }
    }
}

/// Catalog detail joined onto the single-entry view.
#[derive(Debug, Serialize)]
pub struct WatchlistAnimeDetail {
    pub title: String,
    pub episodes: i32,
    pub status: String,
    pub score: f32,
    pub synopsis: String,
    pub genres: String,
    pub demographics: String,
}

impl From<CatalogEntry> for WatchlistAnimeDetail {
    fn from(anime: CatalogEntry) -> Self {
        Self {
            title: anime.title,
            episodes: anime.episodes,
            status: anime.status,
            score: anime.score,
            synopsis: anime.synopsis,
            genres: anime.genres,
            demographics: anime.demographics,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WatchlistItemDto {
    #[serde(flatten)]
    pub entry: WatchlistEntry,
    pub anime: Option<WatchlistAnimeSummary>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistDetailDto {
    #[serde(flatten)]
    pub entry: WatchlistEntry,
    pub anime: Option<WatchlistAnimeDetail>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}
