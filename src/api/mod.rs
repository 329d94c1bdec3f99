use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::gemini::{GeminiClient, GenerativeModel};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, RecommendationService, SeaOrmAuthService, TokenSigner,
};

pub mod auth;
mod catalog;
mod error;
mod recommendations;
mod types;
mod watchlist;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub tokens: TokenSigner,

    pub auth_service: Arc<dyn AuthService>,

    pub recommender: Arc<RecommendationService>,
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let tokens = TokenSigner::new(&config.auth.jwt_secret);

    let model: Option<Arc<dyn GenerativeModel>> = if config.ai.enabled {
        Some(Arc::new(GeminiClient::new(&config.ai)?))
    } else {
        None
    };

    let config = Arc::new(RwLock::new(config));

    let auth_service =
        Arc::new(SeaOrmAuthService::new(store.clone(), tokens.clone())) as Arc<dyn AuthService>;

    let recommender = Arc::new(RecommendationService::new(
        store.clone(),
        config.clone(),
        model,
    ));

    Ok(Arc::new(AppState {
        config,
        store,
        tokens,
        auth_service,
        recommender,
    }))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config.read().await;
        config.server.cors_allowed_origins.clone()
    };

    let protected_routes = Router::new()
        .route("/mylist", post(watchlist::add_to_list))
        .route("/mylist", get(watchlist::get_my_list))
        .route("/mylist/{id}", get(watchlist::get_my_list_by_id))
        .route("/mylist/{id}", put(watchlist::update_my_list))
        .route("/mylist/{id}", delete(watchlist::delete_my_list))
        .route(
            "/recommendations",
            get(recommendations::get_recommendations),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/animes", get(catalog::list_anime))
        .route("/animes/{id}", get(catalog::get_anime))
        .merge(protected_routes)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
