use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::info;

use crate::entities::{anime, prelude::*};
use crate::models::catalog::{CatalogEntry, CatalogPage, NewCatalogEntry};

/// Filters and ordering accepted by the public listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub sort_by_score: bool,
    pub page: u64,
    pub limit: u64,
}

pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn page(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        let page = query.page.max(1);
        let limit = query.limit.max(1);

        let mut select = Anime::find();

        // SQLite LIKE is case-insensitive for ASCII, which matches the
        // substring semantics of the listing filters.
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(anime::Column::Title.contains(search));
        }
        if let Some(genre) = query.genre.as_deref().filter(|g| !g.is_empty()) {
            select = select.filter(anime::Column::Genres.contains(genre));
        }
        if query.sort_by_score {
            select = select.order_by_desc(anime::Column::Score);
        }

        let paginator = select.paginate(&self.conn, limit);
        let total_data = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        let total_pages = total_data.div_ceil(limit);

        Ok(CatalogPage {
            page,
            limit,
            total_data,
            total_pages,
            data: rows.into_iter().map(CatalogEntry::from).collect(),
        })
    }

    pub async fn get(&self, id: i32) -> Result<Option<CatalogEntry>> {
        let row = Anime::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(CatalogEntry::from))
    }

    /// Bounded sample of catalog rows for the recommendation prompt.
    pub async fn sample(&self, limit: u64) -> Result<Vec<CatalogEntry>> {
        let rows = Anime::find().limit(limit).all(&self.conn).await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Anime::find().count(&self.conn).await?)
    }

    /// Idempotent seeding insert: existing rows (matched on jikan_id) are
    /// refreshed with the latest metadata.
    pub async fn upsert_many(&self, entries: &[NewCatalogEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let models = entries.iter().map(|entry| anime::ActiveModel {
            jikan_id: Set(entry.jikan_id),
            title: Set(entry.title.clone()),
            image_url: Set(entry.image_url.clone()),
            episodes: Set(entry.episodes),
            status: Set(entry.status.clone()),
            score: Set(entry.score),
            synopsis: Set(entry.synopsis.clone()),
            genres: Set(entry.genres.clone()),
            demographics: Set(entry.demographics.clone()),
            ..Default::default()
        });

        Anime::insert_many(models)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(anime::Column::JikanId)
                    .update_columns([
                        anime::Column::Title,
                        anime::Column::ImageUrl,
                        anime::Column::Episodes,
                        anime::Column::Status,
                        anime::Column::Score,
                        anime::Column::Synopsis,
                        anime::Column::Genres,
                        anime::Column::Demographics,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        info!("Upserted {} catalog entries", entries.len());
        Ok(())
    }
}
