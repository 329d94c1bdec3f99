use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::models::catalog::NewCatalogEntry;

const JIKAN_API: &str = "https://api.jikan.moe/v4";

#[derive(Debug, Deserialize)]
struct JikanResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
pub struct MalAnime {
    pub mal_id: i32,
    pub title: String,
    pub episodes: Option<i32>,
    pub status: Option<String>,
    pub score: Option<f32>,
    pub synopsis: Option<String>,
    pub images: Option<MalImages>,
    pub genres: Option<Vec<MalGenericInfo>>,
    pub demographics: Option<Vec<MalGenericInfo>>,
}

#[derive(Debug, Deserialize)]
pub struct MalImages {
    pub jpg: Option<MalImageSet>,
}

#[derive(Debug, Deserialize)]
pub struct MalImageSet {
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MalGenericInfo {
    pub mal_id: i32,
    pub name: String,
}

fn join_names(items: Option<Vec<MalGenericInfo>>) -> String {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|i| i.name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<MalAnime> for NewCatalogEntry {
    fn from(anime: MalAnime) -> Self {
        Self {
            jikan_id: anime.mal_id,
            title: anime.title,
            image_url: anime.images.and_then(|i| i.jpg).and_then(|j| j.image_url),
            episodes: anime.episodes.unwrap_or(0),
            status: anime.status.unwrap_or_else(|| "Unknown".to_string()),
            score: anime.score.unwrap_or(0.0),
            synopsis: anime.synopsis.unwrap_or_default(),
            genres: join_names(anime.genres),
            demographics: join_names(anime.demographics),
        }
    }
}

#[derive(Clone)]
pub struct JikanClient {
    client: Client,
}

impl Default for JikanClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JikanClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// One page of the top-anime listing, used by the seeding command.
    pub async fn top_anime(&self, page: u32) -> Result<Vec<MalAnime>> {
        let url = format!("{}/top/anime?page={}", JIKAN_API, page);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Jikan API error: {} - {}", status, body));
        }

        let response: JikanResponse<Vec<MalAnime>> = response.json().await?;

        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_missing_fields_to_seed_defaults() {
        let anime = MalAnime {
            mal_id: 5114,
            title: "Fullmetal Alchemist: Brotherhood".to_string(),
            episodes: None,
            status: None,
            score: None,
            synopsis: None,
            images: None,
            genres: None,
            demographics: None,
        };

        let entry = NewCatalogEntry::from(anime);
        assert_eq!(entry.jikan_id, 5114);
        assert_eq!(entry.episodes, 0);
        assert_eq!(entry.status, "Unknown");
        assert_eq!(entry.score, 0.0);
        assert!(entry.genres.is_empty());
    }

    #[test]
    fn joins_genre_names_with_comma() {
        let genres = Some(vec![
            MalGenericInfo {
                mal_id: 1,
                name: "Action".to_string(),
            },
            MalGenericInfo {
                mal_id: 2,
                name: "Adventure".to_string(),
            },
        ]);

        assert_eq!(join_names(genres), "Action, Adventure");
    }
}
