pub mod api;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use clients::jikan::JikanClient;
pub use config::Config;
use db::Store;
use models::catalog::NewCatalogEntry;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" | "daemon" | "-d" | "--daemon" => run_daemon(config).await,

        "seed" => {
            let pages = args
                .get(2)
                .and_then(|s| s.parse().ok())
                .unwrap_or(config.seed.pages);
            cmd_seed(&config, pages).await
        }

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        other => {
            println!("Unknown command: {other}");
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("anitrack v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: anitrack <command>");
    println!();
    println!("Commands:");
    println!("  serve           Start the web API");
    println!("  seed [pages]    Populate the catalog from Jikan top-anime pages");
    println!("  init            Create a default config.toml");
    println!("  help            Show this help");
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    info!(
        "Anitrack v{} starting in server mode...",
        env!("CARGO_PKG_VERSION")
    );

    let port = config.server.port;
    let state = api::create_app_state_from_config(config).await?;

    let catalog_entries = state.store.catalog_count().await.unwrap_or(0);
    if catalog_entries == 0 {
        info!("Catalog is empty; run 'anitrack seed' to populate it");
    }

    let app = api::router(state).await;
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web Server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

/// Fetch the Jikan top-anime listing page by page and upsert it into the
/// catalog. Idempotent; safe to re-run for refreshes.
async fn cmd_seed(config: &Config, pages: u32) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let jikan = JikanClient::new();
    let delay = std::time::Duration::from_millis(config.seed.page_delay_ms);
    let mut total = 0usize;

    for page in 1..=pages {
        info!("Fetching page {page}...");

        let batch = match jikan.top_anime(page).await {
            Ok(batch) => batch,
            Err(e) => {
                // A missing page usually means we ran past the end of the
                // listing; keep whatever was fetched so far.
                error!("Failed to fetch page {page}: {e}");
                break;
            }
        };

        if batch.is_empty() {
            break;
        }

        let entries: Vec<NewCatalogEntry> =
            batch.into_iter().map(NewCatalogEntry::from).collect();

        store
            .upsert_catalog_entries(&entries)
            .await
            .context("Failed to upsert catalog entries")?;
        total += entries.len();

        // Stay under the Jikan rate limit
        if page < pages {
            tokio::time::sleep(delay).await;
        }
    }

    info!("Seeding complete: {total} entries processed");
    println!("✓ Seeded {total} catalog entries");
    Ok(())
}
