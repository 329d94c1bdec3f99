use serde::{Deserialize, Serialize};

use crate::entities::anime;

/// A catalog row as served by the public listing and detail endpoints.
/// Seeded from Jikan; read-only at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i32,
    pub jikan_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub episodes: i32,
    pub status: String,
    pub score: f32,
    pub synopsis: String,
    pub genres: String,
    pub demographics: String,
}

impl From<anime::Model> for CatalogEntry {
    fn from(model: anime::Model) -> Self {
        Self {
            id: model.id,
            jikan_id: model.jikan_id,
            title: model.title,
            image_url: model.image_url,
            episodes: model.episodes,
            status: model.status,
            score: model.score,
            synopsis: model.synopsis,
            genres: model.genres,
            demographics: model.demographics,
        }
    }
}

/// A catalog row as produced by the seeding step, before it has a database id.
#[derive(Debug, Clone)]
pub struct NewCatalogEntry {
    pub jikan_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub episodes: i32,
    pub status: String,
    pub score: f32,
    pub synopsis: String,
    pub genres: String,
    pub demographics: String,
}

/// One page of catalog results plus the pagination metadata the listing
/// endpoint exposes.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub page: u64,
    pub limit: u64,
    pub total_data: u64,
    pub total_pages: u64,
    pub data: Vec<CatalogEntry>,
}
