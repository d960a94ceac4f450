use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::form::FormInput;
use super::validation::normalize_query;
use super::{ApiError, AppState, views};
use crate::models::AnimeInput;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /animes
pub async fn list_animes(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Html<String>, ApiError> {
    let needle = normalize_query(params.q.as_deref());
    let animes = state.store.animes().list(needle.as_deref()).await?;

    Ok(Html(views::anime::list(
        &user.username,
        &animes,
        params.q.as_deref().unwrap_or_default(),
    )))
}

/// GET /animes/new
pub async fn new_anime_form(AuthUser(user): AuthUser) -> Html<String> {
    Html(views::anime::new_form(&user.username))
}

/// POST /animes
pub async fn create_anime(
    State(state): State<Arc<AppState>>,
    FormInput(fields): FormInput,
) -> Result<Redirect, ApiError> {
    let anime = state
        .store
        .animes()
        .create(AnimeInput::from_fields(&fields))
        .await?;

    Ok(Redirect::to(&format!("/animes/{}", anime.id)))
}

/// GET /animes/{id}
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let (anime, reviews) = state
        .store
        .animes()
        .get_with_reviews(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Anime"))?;

    Ok(Html(views::anime::detail(&user.username, &anime, &reviews)))
}

/// GET /animes/{id}/edit
pub async fn edit_anime_form(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let anime = state
        .store
        .animes()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Anime"))?;

    Ok(Html(views::anime::edit_form(&user.username, &anime)))
}

/// PUT /animes/{id}
pub async fn update_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    FormInput(fields): FormInput,
) -> Result<Redirect, ApiError> {
    state
        .store
        .animes()
        .update(&id, AnimeInput::from_fields(&fields))
        .await?;

    Ok(Redirect::to(&format!("/animes/{id}")))
}

/// DELETE /animes/{id}
pub async fn delete_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    state.store.animes().delete(&id).await?;
    Ok(Redirect::to("/animes"))
}
