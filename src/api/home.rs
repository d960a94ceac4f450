use axum::{extract::State, response::Html};
use std::sync::Arc;
use tracing::error;

use super::auth::AuthUser;
use super::{AppState, views};

/// GET /protected
///
/// A broken store still renders the page, just without the latest anime.
pub async fn protected(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Html<String> {
    let latest = match state.store.animes().latest().await {
        Ok(latest) => latest,
        Err(e) => {
            error!(error = %e, "Failed to load latest anime");
            None
        }
    };

    Html(views::auth::home(&user.username, latest.as_ref()))
}
