//! Custom Axum extractors
//!
//! Wrap the stock extractors so every rejection is an `ApiError` with a
//! JSON body instead of axum's plain-text default.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::{ApiError, BAD_ID};

/// Extract a record id from the path. Non-numeric or non-positive ids are rejected.
pub struct ValidId(pub i64);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request(BAD_ID))?;

        parse_id(&raw).map(Self).ok_or_else(|| {
            tracing::debug!(id = %raw, "rejected path id");
            ApiError::bad_request(BAD_ID)
        })
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

/// JSON request body with 400 on any rejection (syntax, content type, field types)
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(reason = %rejection.body_text(), "rejected request body");
            ApiError::bad_request(format!("Bad request: {}", rejection.body_text()))
        })?;
        Ok(Self(value))
    }
}

/// Query string with 400 on rejection
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::bad_request(format!("Bad request: {}", rejection.body_text()))
            })?;
        Ok(Self(value))
    }
}
