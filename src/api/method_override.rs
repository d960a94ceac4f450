//! Lets HTML forms, which can only GET and POST, reach PUT and DELETE routes.
//!
//! A POST is re-dispatched with the verb named by the `X-HTTP-Method-Override`
//! header, the `_method` query parameter or the `_method` field of an
//! urlencoded body, checked in that order. This has to run before routing.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, Method, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::constants::limits::MAX_FORM_BYTES;

pub const OVERRIDE_HEADER: &str = "x-http-method-override";
pub const OVERRIDE_FIELD: &str = "_method";

pub async fn method_override(request: Request, next: Next) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();

    let mut target = from_header(&parts.headers).or_else(|| from_query(parts.uri.query()));

    let body = if target.is_none() && is_urlencoded(&parts.headers) {
        let bytes = match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to buffer form body");
                return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
            }
        };
        target = from_form(&bytes);
        Body::from(bytes)
    } else {
        body
    };

    if let Some(method) = target {
        tracing::debug!(path = %parts.uri.path(), %method, "Method override");
        parts.method = method;
    }

    next.run(Request::from_parts(parts, body)).await
}

/// Only verbs a form cannot send natively may be requested.
#[must_use]
pub fn parse_override(value: &str) -> Option<Method> {
    match value.trim().to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

fn from_header(headers: &HeaderMap) -> Option<Method> {
    headers
        .get(OVERRIDE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_override)
}

fn from_query(query: Option<&str>) -> Option<Method> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == OVERRIDE_FIELD)
        .and_then(|(_, value)| parse_override(&value))
}

fn from_form(body: &[u8]) -> Option<Method> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == OVERRIDE_FIELD)
        .and_then(|(_, value)| parse_override(&value))
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}
