use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::clients::tvdb::{Catalog, TvdbClient};
use crate::config::Config;
use crate::db::Store;
use crate::mail::{LogMailer, MailSender};
use crate::services::episodes::EpisodeService;
use crate::services::search::SearchService;
use crate::services::subscriptions::SubscriptionService;
use crate::services::users::UserService;

pub mod auth;
mod episodes;
mod error;
mod feeds;
mod news;
mod profile;
mod registration;
mod search;
mod shows;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Store,

    pub user_service: Arc<UserService>,
    pub subscription_service: Arc<SubscriptionService>,
    pub episode_service: Arc<EpisodeService>,
    pub search_service: Arc<SearchService>,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::new(&config.database_url()).await?;

    let catalog: Arc<dyn Catalog> = Arc::new(TvdbClient::new(
        &config.catalog.base_url,
        config.catalog.timeout_seconds,
    )?);
    let mailer: Arc<dyn MailSender> = Arc::new(LogMailer);

    Ok(create_app_state_with(config, store, catalog, mailer))
}

/// Assemble state from pre-built collaborators. Tests use this to inject
/// an in-memory store, a scripted catalog and a capturing mailer.
#[must_use]
pub fn create_app_state_with(
    config: Config,
    store: Store,
    catalog: Arc<dyn Catalog>,
    mailer: Arc<dyn MailSender>,
) -> Arc<AppState> {
    let user_service = Arc::new(UserService::new(
        store.clone(),
        mailer,
        config.security.clone(),
        config.server.clone(),
    ));
    let subscription_service = Arc::new(SubscriptionService::new(store.clone(), catalog.clone()));
    let episode_service = Arc::new(EpisodeService::new(store.clone()));
    let search_service = Arc::new(SearchService::new(catalog));

    Arc::new(AppState {
        config,
        store,
        user_service,
        subscription_service,
        episode_service,
        search_service,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(60)));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(registration::register))
        .route("/auth/recover", post(registration::request_recovery))
        .route("/auth/recover/reset", post(registration::reset_password))
        .route("/feeds", get(feeds::feed_missing_user))
        .route("/feeds/{user}", get(feeds::feed_missing_token))
        .route("/feeds/{user}/{token}", get(feeds::feed))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/episodes", get(episodes::list_episodes))
        .route("/shows", get(shows::list_shows))
        .route("/shows", post(shows::subscribe))
        .route("/shows/{id}", axum::routing::delete(shows::unsubscribe))
        .route("/shows/{id}/banner", get(shows::banner))
        .route("/search", get(search::search_shows))
        .route("/profile", get(profile::get_profile))
        .route("/profile", put(profile::update_profile))
        .route("/profile/password", put(profile::change_password))
        .route("/profile/token", post(profile::reset_feed_token))
        .route("/news", get(news::list_news))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
