use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::convert::Infallible;
use std::sync::Arc;

use super::form::FormInput;
use super::{ApiError, AppState, views};
use crate::constants::SESSION_COOKIE;
use crate::models::Identity;
use crate::services::AuthError;

// ============================================================================
// Extractors
// ============================================================================

/// Identity resolved from the session cookie, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Identity>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or(Self(None)))
    }
}

/// Like [`CurrentUser`] but redirects to the login page when anonymous.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => user,
            Err(never) => match never {},
        };
        user.map(Self).ok_or_else(|| Redirect::to("/login"))
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Decodes the session cookie and attaches the result to the request.
/// Invalid or expired tokens simply make the request anonymous.
pub async fn resolve_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.verify(cookie.value()));

    if let Some(identity) = &identity {
        tracing::Span::current().record("user", identity.username.as_str());
    }

    request.extensions_mut().insert(CurrentUser(identity));
    next.run(request).await
}

/// Gate for protected routes.
pub async fn require_auth(CurrentUser(user): CurrentUser, request: Request, next: Next) -> Response {
    if user.is_none() {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn index() -> Redirect {
    Redirect::to("/login")
}

/// GET /login
pub async fn login_page(CurrentUser(user): CurrentUser) -> Response {
    if user.is_some() {
        return Redirect::to("/animes").into_response();
    }
    Html(views::auth::login()).into_response()
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    FormInput(fields): FormInput,
) -> Result<Response, ApiError> {
    let username = fields.text("username").unwrap_or_default();
    let password = fields.text("password").unwrap_or_default();

    let identity = state
        .credentials
        .login(&username, &password)
        .await
        .map_err(|e| {
            if !matches!(e, AuthError::Internal(_)) {
                tracing::info!(username = %username, reason = %e, "Login rejected");
            }
            credential_error(e, ApiError::Unauthorized)
        })?;

    start_session(&state, jar, &identity)
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    FormInput(fields): FormInput,
) -> Result<Response, ApiError> {
    let username = fields.text("username").unwrap_or_default();
    let password = fields.text("password").unwrap_or_default();

    let identity = state
        .credentials
        .register(&username, &password)
        .await
        .map_err(|e| credential_error(e, ApiError::ValidationError))?;

    start_session(&state, jar, &identity)
}

/// POST /logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/");
    (jar.remove(removal), Redirect::to("/login"))
}

// ============================================================================
// Helpers
// ============================================================================

/// Policy failures carry their message to the client through `rejected`;
/// storage failures become a 500.
fn credential_error(err: AuthError, rejected: fn(String) -> ApiError) -> ApiError {
    match err {
        AuthError::Internal(msg) => ApiError::internal(msg),
        other => rejected(other.to_string()),
    }
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    identity: &Identity,
) -> Result<Response, ApiError> {
    let token = state
        .sessions
        .issue(identity)
        .map_err(|e| ApiError::internal(format!("Failed to sign session token: {e}")))?;

    tracing::info!(username = %identity.username, "Session started");

    let jar = jar.add(session_cookie(
        token,
        state.sessions.ttl_seconds(),
        state.config.secure_cookies(),
    ));
    Ok((jar, Redirect::to("/animes")).into_response())
}

#[must_use]
pub fn session_cookie(token: String, ttl_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(ttl_seconds))
        .path("/")
        .secure(secure)
        .build()
}
