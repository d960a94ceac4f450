use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::db::{Store, UserRepository};
use crate::services::{CredentialService, FileCredentialService, SessionCodec, session};

mod anime;
pub mod auth;
mod error;
mod form;
mod home;
pub mod method_override;
mod observability;
mod reviews;
mod validation;
pub mod views;

pub use error::ApiError;
pub use form::FormInput;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub credentials: Arc<dyn CredentialService>,

    pub sessions: SessionCodec,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::open(&config.storage.db_path).await?;
    let users = UserRepository::open(&config.storage.users_path, config.security.clone()).await?;

    let secret = config.auth.jwt_secret.clone().unwrap_or_else(|| {
        warn!("No JWT secret configured, generated a random one. Sessions end on restart.");
        session::generate_secret()
    });
    let sessions = SessionCodec::new(secret.as_bytes(), config.auth.session_ttl_seconds);

    let credentials: Arc<dyn CredentialService> =
        Arc::new(FileCredentialService::new(users, config.auth.clone()));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        credentials,
        sessions,
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let public_path = state.config.server.public_path.clone();

    let app = Router::new()
        .merge(create_protected_router())
        .route("/", get(auth::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .nest_service("/public", ServeDir::new(public_path))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::resolve_session,
        ))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state);

    // Overrides must be applied before the inner router picks a route.
    Router::new()
        .fallback_service(app)
        .layer(middleware::from_fn(method_override::method_override))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/protected", get(home::protected))
        .route(
            "/animes",
            get(anime::list_animes).post(anime::create_anime),
        )
        .route("/animes/new", get(anime::new_anime_form))
        .route(
            "/animes/{id}",
            get(anime::get_anime)
                .put(anime::update_anime)
                .delete(anime::delete_anime),
        )
        .route("/animes/{id}/edit", get(anime::edit_anime_form))
        .route(
            "/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route("/reviews/new", get(reviews::new_review_form))
        .route(
            "/reviews/{id}",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route("/reviews/{id}/edit", get(reviews::edit_review_form))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::require_auth))
}
