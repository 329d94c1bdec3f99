use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::catalog::{CatalogEntry, CatalogPage, NewCatalogEntry};
use crate::models::watchlist::WatchlistEntry;

pub mod migrator;
pub mod repositories;

pub use repositories::catalog::CatalogQuery;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        self.user_repo().create(username, email, password).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub async fn catalog_page(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        self.catalog_repo().page(query).await
    }

    pub async fn get_catalog_entry(&self, id: i32) -> Result<Option<CatalogEntry>> {
        self.catalog_repo().get(id).await
    }

    pub async fn catalog_sample(&self, limit: u64) -> Result<Vec<CatalogEntry>> {
        self.catalog_repo().sample(limit).await
    }

    pub async fn catalog_count(&self) -> Result<u64> {
        self.catalog_repo().count().await
    }

    pub async fn upsert_catalog_entries(&self, entries: &[NewCatalogEntry]) -> Result<()> {
        self.catalog_repo().upsert_many(entries).await
    }

    // ------------------------------------------------------------------
    // Watchlist
    // ------------------------------------------------------------------

    pub async fn add_watchlist_entry(
        &self,
        user_id: i32,
        anime_id: i32,
    ) -> Result<WatchlistEntry> {
        self.watchlist_repo().add(user_id, anime_id).await
    }

    pub async fn list_watchlist(
        &self,
        user_id: i32,
    ) -> Result<Vec<(WatchlistEntry, Option<CatalogEntry>)>> {
        self.watchlist_repo().list_for_user(user_id).await
    }

    pub async fn get_watchlist_entry(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<(WatchlistEntry, Option<CatalogEntry>)>> {
        self.watchlist_repo().get_for_user(id, user_id).await
    }

    pub async fn update_watchlist_progress(
        &self,
        id: i32,
        user_id: i32,
        progress: i32,
    ) -> Result<Option<(WatchlistEntry, Option<CatalogEntry>)>> {
        self.watchlist_repo()
            .update_progress(id, user_id, progress)
            .await
    }

    pub async fn delete_watchlist_entry(&self, id: i32, user_id: i32) -> Result<bool> {
        self.watchlist_repo().delete(id, user_id).await
    }
}
