use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{anime, prelude::*, watchlist_entries};
use crate::models::catalog::CatalogEntry;
use crate::models::watchlist::{WatchStatus, WatchlistEntry};

pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create an entry with zero progress. Status starts as planned per the
    /// derivation rule; duplicate checking is the caller's concern.
    pub async fn add(&self, user_id: i32, anime_id: i32) -> Result<WatchlistEntry> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = watchlist_entries::ActiveModel {
            user_id: Set(user_id),
            anime_id: Set(anime_id),
            progress: Set(0),
            status: Set(WatchStatus::Planned.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(WatchlistEntry::from(model))
    }

    /// All entries for a user with the joined catalog row.
    pub async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<(WatchlistEntry, Option<CatalogEntry>)>> {
        let rows = WatchlistEntries::find()
            .filter(watchlist_entries::Column::UserId.eq(user_id))
            .order_by_asc(watchlist_entries::Column::Id)
            .find_also_related(anime::Entity)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(entry, anime)| (WatchlistEntry::from(entry), anime.map(CatalogEntry::from)))
            .collect())
    }

    /// Scoped by both entry id and owner id so one user can never read
    /// another user's entry.
    pub async fn get_for_user(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<(WatchlistEntry, Option<CatalogEntry>)>> {
        let row = WatchlistEntries::find_by_id(id)
            .filter(watchlist_entries::Column::UserId.eq(user_id))
            .find_also_related(anime::Entity)
            .one(&self.conn)
            .await?;

        Ok(row
            .map(|(entry, anime)| (WatchlistEntry::from(entry), anime.map(CatalogEntry::from))))
    }

    /// Set progress and recompute status from the joined anime's episode
    /// count. Returns None when the entry is absent or owned by someone else.
    pub async fn update_progress(
        &self,
        id: i32,
        user_id: i32,
        progress: i32,
    ) -> Result<Option<(WatchlistEntry, Option<CatalogEntry>)>> {
        let row = WatchlistEntries::find_by_id(id)
            .filter(watchlist_entries::Column::UserId.eq(user_id))
            .find_also_related(anime::Entity)
            .one(&self.conn)
            .await?;

        let Some((entry, anime)) = row else {
            return Ok(None);
        };

        let episodes = anime.as_ref().map_or(0, |a| a.episodes);
        let status = WatchStatus::derive(progress, episodes);
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: watchlist_entries::ActiveModel = entry.into();
        active.progress = Set(progress);
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(now);
        let updated = active.update(&self.conn).await?;

        Ok(Some((
            WatchlistEntry::from(updated),
            anime.map(CatalogEntry::from),
        )))
    }

    /// Returns false when the entry is absent or owned by someone else.
    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool> {
        let result = WatchlistEntries::delete_many()
            .filter(watchlist_entries::Column::Id.eq(id))
            .filter(watchlist_entries::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
