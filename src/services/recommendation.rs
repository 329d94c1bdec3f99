//! Recommendation engine: prompt the generative provider when enabled and
//! reachable, fall back to a local genre-frequency heuristic in every other
//! case. Only database failures escape this module.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::clients::gemini::{GenerativeModel, ModelError};
use crate::config::Config;
use crate::db::Store;
use crate::models::catalog::CatalogEntry;

const FALLBACK_SIZE: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub reason: String,
    pub image_url: Option<String>,
}

/// The `{title, reason}` items the model is asked to answer with.
#[derive(Debug, Deserialize)]
struct AiItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    reason: String,
}

pub struct RecommendationService {
    store: Store,
    config: Arc<RwLock<Config>>,
    model: Option<Arc<dyn GenerativeModel>>,
}

impl RecommendationService {
    #[must_use]
    pub const fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        model: Option<Arc<dyn GenerativeModel>>,
    ) -> Self {
        Self {
            store,
            config,
            model,
        }
    }

    /// Recommendations for one user. The returned error is always a data
    /// access failure; every AI-path problem degrades to the local heuristic.
    pub async fn recommend(&self, user_id: i32) -> Result<Vec<Recommendation>> {
        let my_list = self.store.list_watchlist(user_id).await?;

        let (ai_enabled, sample_size) = {
            let config = self.config.read().await;
            (config.ai.enabled, config.ai.catalog_sample_size)
        };

        let catalog = self.store.catalog_sample(sample_size).await?;

        let watched: Vec<CatalogEntry> = my_list
            .into_iter()
            .filter_map(|(_, anime)| anime)
            .collect();

        let Some(model) = self.model.as_ref().filter(|_| ai_enabled) else {
            warn!("Remote AI disabled, using local fallback");
            return Ok(local_fallback(&watched, &catalog));
        };

        match ai_recommendations(model.as_ref(), &watched, &catalog).await {
            Ok(recommendations) => Ok(recommendations),
            Err(e) => {
                warn!("AI recommendation failed, falling back to local recommender: {e}");
                Ok(local_fallback(&watched, &catalog))
            }
        }
    }
}

/// The AI path: probe availability, invoke the first supported call shape,
/// normalize the reply, parse it, and enrich with catalog images. Any error
/// here means "use the fallback".
pub async fn ai_recommendations(
    model: &dyn GenerativeModel,
    watched: &[CatalogEntry],
    catalog: &[CatalogEntry],
) -> Result<Vec<Recommendation>> {
    let available = model.list_models().await?;
    if available.is_empty() {
        anyhow::bail!("No compatible AI model");
    }

    let prompt = build_prompt(watched, catalog);
    let raw = invoke_preferred(model, &prompt).await?;

    let text = normalize_reply(&raw);
    debug!("Model raw text: {text}");

    let items: Vec<AiItem> = serde_json::from_str(&text)?;

    Ok(items
        .into_iter()
        .map(|item| {
            let image_url = match_image(&item.title, catalog);
            Recommendation {
                title: item.title,
                reason: item.reason,
                image_url,
            }
        })
        .collect())
}

/// Try the provider's call shapes in fixed preference order, using the first
/// one it supports.
async fn invoke_preferred(model: &dyn GenerativeModel, prompt: &str) -> Result<Value, ModelError> {
    match model.generate_content(prompt).await {
        Err(ModelError::Unsupported(_)) => {}
        other => return other,
    }
    match model.generate(prompt).await {
        Err(ModelError::Unsupported(_)) => {}
        other => return other,
    }
    match model.predict(prompt).await {
        Err(ModelError::Unsupported(_)) => {}
        other => return other,
    }

    Err(ModelError::Unsupported("no supported model method found"))
}

fn build_prompt(watched: &[CatalogEntry], catalog: &[CatalogEntry]) -> String {
    let titles = watched
        .iter()
        .map(|a| a.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let genres = watched
        .iter()
        .map(|a| a.genres.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let candidates = catalog
        .iter()
        .map(|a| format!("{} ({})", a.title, a.genres))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an anime recommendation system.\n\
         The user has already watched: {titles}.\n\
         Their favourite genres are: {genres}.\n\
         Recommend 5 anime from the following list:\n\
         {candidates}\n\n\
         Answer only as JSON with the structure:\n\
         [\n  {{ \"title\": \"Anime Title\", \"reason\": \"Why it fits\" }}\n]"
    )
}

/// Flatten the known provider reply shapes to a single string:
/// nested `response.text`, top-level `text`, an `output[0].content[]` array,
/// or a plain string. Anything else is serialized wholesale and will fail
/// the JSON parse downstream, which triggers the fallback.
#[must_use]
pub fn normalize_reply(value: &Value) -> String {
    if let Some(text) = value
        .get("response")
        .and_then(|r| r.get("text"))
        .and_then(Value::as_str)
    {
        return text.to_string();
    }

    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return text.to_string();
    }

    if let Some(content) = value
        .get("output")
        .and_then(Value::as_array)
        .and_then(|output| output.first())
        .and_then(|first| first.get("content"))
        .and_then(Value::as_array)
    {
        return content
            .iter()
            .map(|c| {
                c.get("text")
                    .and_then(Value::as_str)
                    .map_or_else(|| c.to_string(), ToString::to_string)
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    if let Some(text) = value.as_str() {
        return text.to_string();
    }

    value.to_string()
}

/// Case-insensitive exact-or-substring title match against the catalog
/// sample. Empty titles never match.
fn match_image(title: &str, catalog: &[CatalogEntry]) -> Option<String> {
    if title.is_empty() {
        return None;
    }

    let needle = title.to_lowercase();

    catalog
        .iter()
        .find(|a| {
            let haystack = a.title.to_lowercase();
            haystack == needle || haystack.contains(&needle)
        })
        .and_then(|a| a.image_url.clone())
}

/// Genre-frequency heuristic: rank the user's watched genres, keep catalog
/// entries matching the top genre (no filter when there is no genre signal),
/// order by score descending, take the top 5.
#[must_use]
pub fn local_fallback(watched: &[CatalogEntry], catalog: &[CatalogEntry]) -> Vec<Recommendation> {
    let mut genre_counts: HashMap<String, usize> = HashMap::new();
    for anime in watched {
        for genre in anime
            .genres
            .split([',', ';'])
            .map(str::trim)
            .filter(|g| !g.is_empty())
        {
            *genre_counts.entry(genre.to_string()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = genre_counts.into_iter().collect();
    // Name as tiebreaker keeps the ranking deterministic
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let preferred_genre = ranked.first().map(|(genre, _)| genre.clone());

    let mut candidates: Vec<&CatalogEntry> = match &preferred_genre {
        Some(genre) => {
            let needle = genre.to_lowercase();
            catalog
                .iter()
                .filter(|a| a.genres.to_lowercase().contains(&needle))
                .collect()
        }
        None => catalog.iter().collect(),
    };

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    candidates
        .into_iter()
        .take(FALLBACK_SIZE)
        .map(|a| Recommendation {
            title: a.title.clone(),
            reason: preferred_genre.as_ref().map_or_else(
                || "Highly rated in database".to_string(),
                |genre| format!("Matches your interest in {genre}"),
            ),
            image_url: a.image_url.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    fn entry(id: i32, title: &str, genres: &str, score: f32) -> CatalogEntry {
        CatalogEntry {
            id,
            jikan_id: id,
            title: title.to_string(),
            image_url: Some(format!("https://img.example/{id}.jpg")),
            episodes: 12,
            status: "Finished Airing".to_string(),
            score,
            synopsis: String::new(),
            genres: genres.to_string(),
            demographics: String::new(),
        }
    }

    // ------------------------------------------------------------------
    // Reply normalization
    // ------------------------------------------------------------------

    #[test]
    fn normalizes_nested_response_text() {
        let value = json!({ "response": { "text": "[{\"title\":\"X\"}]" } });
        assert_eq!(normalize_reply(&value), "[{\"title\":\"X\"}]");
    }

    #[test]
    fn normalizes_top_level_text() {
        let value = json!({ "text": "hello" });
        assert_eq!(normalize_reply(&value), "hello");
    }

    #[test]
    fn normalizes_output_content_array() {
        let value = json!({
            "output": [
                { "content": [ { "text": "line one" }, { "text": "line two" } ] }
            ]
        });
        assert_eq!(normalize_reply(&value), "line one\nline two");
    }

    #[test]
    fn output_content_items_without_text_are_serialized() {
        let value = json!({
            "output": [ { "content": [ { "data": 1 } ] } ]
        });
        assert_eq!(normalize_reply(&value), "{\"data\":1}");
    }

    #[test]
    fn normalizes_plain_string() {
        let value = json!("just a string");
        assert_eq!(normalize_reply(&value), "just a string");
    }

    #[test]
    fn unknown_shapes_are_serialized_wholesale() {
        let value = json!({ "candidates": [] });
        assert_eq!(normalize_reply(&value), "{\"candidates\":[]}");
    }

    // ------------------------------------------------------------------
    // Local fallback
    // ------------------------------------------------------------------

    #[test]
    fn fallback_filters_by_top_genre_and_sorts_by_score() {
        let watched = vec![
            entry(1, "A", "Action, Drama", 8.0),
            entry(2, "B", "Action", 7.5),
            entry(3, "C", "Drama", 7.0),
        ];
        let catalog = vec![
            entry(10, "Low Action", "Action", 6.0),
            entry(11, "High Action", "Action, Fantasy", 9.0),
            entry(12, "Pure Drama", "Drama", 9.5),
            entry(13, "Mid Action", "action", 7.0),
        ];

        // Action appears twice in the watchlist, Drama twice too; Action wins
        // the alphabetical tiebreak.
        let recs = local_fallback(&watched, &catalog);

        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].title, "High Action");
        assert_eq!(recs[1].title, "Mid Action");
        assert_eq!(recs[2].title, "Low Action");
        assert_eq!(recs[0].reason, "Matches your interest in Action");
        assert!(recs[0].image_url.is_some());
    }

    #[test]
    fn fallback_without_genre_signal_takes_highest_rated() {
        let catalog: Vec<CatalogEntry> = (0..8)
            .map(|i| entry(i, &format!("Anime {i}"), "Comedy", f32::from(i as u8)))
            .collect();

        let recs = local_fallback(&[], &catalog);

        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0].title, "Anime 7");
        assert_eq!(recs[0].reason, "Highly rated in database");
    }

    #[test]
    fn fallback_on_empty_catalog_is_empty() {
        assert!(local_fallback(&[], &[]).is_empty());
    }

    // ------------------------------------------------------------------
    // AI path with fake providers
    // ------------------------------------------------------------------

    /// Provider that only supports one legacy call shape and replies with a
    /// fixed value.
    struct PredictOnly {
        reply: Value,
    }

    #[async_trait]
    impl GenerativeModel for PredictOnly {
        async fn list_models(&self) -> Result<Vec<String>, ModelError> {
            Ok(vec!["models/text-bison-001".to_string()])
        }

        async fn generate_content(&self, _prompt: &str) -> Result<Value, ModelError> {
            Err(ModelError::Unsupported("generate_content"))
        }

        async fn generate(&self, _prompt: &str) -> Result<Value, ModelError> {
            Err(ModelError::Unsupported("generate"))
        }

        async fn predict(&self, _prompt: &str) -> Result<Value, ModelError> {
            Ok(self.reply.clone())
        }
    }

    struct NoModels;

    #[async_trait]
    impl GenerativeModel for NoModels {
        async fn list_models(&self) -> Result<Vec<String>, ModelError> {
            Ok(vec![])
        }

        async fn generate_content(&self, _prompt: &str) -> Result<Value, ModelError> {
            unreachable!("must not be invoked when no model is available")
        }

        async fn generate(&self, _prompt: &str) -> Result<Value, ModelError> {
            unreachable!()
        }

        async fn predict(&self, _prompt: &str) -> Result<Value, ModelError> {
            unreachable!()
        }
    }

    struct Unsupported;

    #[async_trait]
    impl GenerativeModel for Unsupported {
        async fn list_models(&self) -> Result<Vec<String>, ModelError> {
            Ok(vec!["models/chat-bison-001".to_string()])
        }

        async fn generate_content(&self, _prompt: &str) -> Result<Value, ModelError> {
            Err(ModelError::Unsupported("generate_content"))
        }

        async fn generate(&self, _prompt: &str) -> Result<Value, ModelError> {
            Err(ModelError::Unsupported("generate"))
        }

        async fn predict(&self, _prompt: &str) -> Result<Value, ModelError> {
            Err(ModelError::Unsupported("predict"))
        }
    }

    #[tokio::test]
    async fn ai_path_uses_first_supported_shape_and_enriches_images() {
        let catalog = vec![
            entry(1, "Steins;Gate", "Sci-Fi, Thriller", 9.1),
            entry(2, "Mushishi", "Slice of Life, Supernatural", 8.7),
        ];
        let model = PredictOnly {
            reply: json!({
                "text": r#"[
                    {"title": "steins;gate", "reason": "time travel"},
                    {"title": "Nowhere Show", "reason": "made up"}
                ]"#
            }),
        };

        let recs = ai_recommendations(&model, &[], &catalog).await.unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "steins;gate");
        assert_eq!(recs[0].image_url.as_deref(), Some("https://img.example/1.jpg"));
        assert!(recs[1].image_url.is_none());
    }

    #[tokio::test]
    async fn ai_path_fails_when_no_model_is_available() {
        let result = ai_recommendations(&NoModels, &[], &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ai_path_fails_when_no_call_shape_is_supported() {
        let result = ai_recommendations(&Unsupported, &[], &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ai_path_fails_on_malformed_reply() {
        let model = PredictOnly {
            reply: json!({ "text": "sorry, I cannot do that" }),
        };
        let result = ai_recommendations(&model, &[], &[]).await;
        assert!(result.is_err());
    }

    #[test]
    fn prompt_lists_watched_titles_and_candidates() {
        let watched = vec![entry(1, "Monster", "Mystery, Thriller", 8.8)];
        let catalog = vec![entry(2, "Parasyte", "Action, Horror", 8.3)];

        let prompt = build_prompt(&watched, &catalog);

        assert!(prompt.contains("The user has already watched: Monster."));
        assert!(prompt.contains("Mystery, Thriller"));
        assert!(prompt.contains("Parasyte (Action, Horror)"));
        assert!(prompt.contains("\"title\""));
    }
}
