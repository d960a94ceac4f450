use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};

use super::ApiError;
use crate::models::Fields;

/// Request body as raw [`Fields`], accepting both urlencoded forms and JSON.
pub struct FormInput(pub Fields);

impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;

        if is_json {
            Ok(Self(Fields::from_json_slice(&body)?))
        } else {
            Ok(Self(Fields::from_urlencoded(&body)))
        }
    }
}
