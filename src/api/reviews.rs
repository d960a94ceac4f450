use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::form::FormInput;
use super::validation::{non_empty, normalize_query};
use super::{ApiError, AppState, views};
use crate::db::ReviewFilter;

#[derive(Deserialize)]
pub struct ReviewListQuery {
    pub q: Option<String>,
    #[serde(rename = "animeId")]
    pub anime_id: Option<String>,
}

#[derive(Deserialize)]
pub struct NewReviewQuery {
    #[serde(rename = "animeId")]
    pub anime_id: Option<String>,
}

/// GET /reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<ReviewListQuery>,
) -> Result<Html<String>, ApiError> {
    let anime_id = non_empty(params.anime_id.as_deref());
    let filter = ReviewFilter {
        anime_id: anime_id.map(str::to_string),
        query: normalize_query(params.q.as_deref()),
    };
    let (reviews, animes) = state.store.reviews().list(&filter).await?;

    Ok(Html(views::reviews::list(
        &user.username,
        &reviews,
        &animes,
        params.q.as_deref().unwrap_or_default(),
        anime_id,
    )))
}

/// GET /reviews/new
pub async fn new_review_form(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<NewReviewQuery>,
) -> Result<Html<String>, ApiError> {
    let animes = state.store.animes().list(None).await?;
    Ok(Html(views::reviews::new_form(
        &user.username,
        &animes,
        non_empty(params.anime_id.as_deref()),
    )))
}

/// POST /reviews
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    FormInput(fields): FormInput,
) -> Result<Redirect, ApiError> {
    let review = state.store.reviews().create(&fields).await?;
    Ok(Redirect::to(&format!("/reviews/{}", review.id)))
}

/// GET /reviews/{id}
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let (review, anime) = state
        .store
        .reviews()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review"))?;

    Ok(Html(views::reviews::detail(
        &user.username,
        &review,
        anime.as_ref(),
    )))
}

/// GET /reviews/{id}/edit
pub async fn edit_review_form(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let (review, animes) = state
        .store
        .reviews()
        .get_for_edit(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review"))?;

    Ok(Html(views::reviews::edit_form(
        &user.username,
        &review,
        &animes,
    )))
}

/// PUT /reviews/{id}
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    FormInput(fields): FormInput,
) -> Result<Redirect, ApiError> {
    state.store.reviews().update(&id, &fields).await?;
    Ok(Redirect::to(&format!("/reviews/{id}")))
}

/// DELETE /reviews/{id}
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    state.store.reviews().delete(&id).await?;
    Ok(Redirect::to("/reviews"))
}
