//! Extractors whose rejections render as JSON [`ApiError`]s.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts};
use bursar_shared::AppError;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// [`axum::extract::Path`] with JSON rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// [`axum::extract::Query`] with JSON rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// [`axum::Json`] with JSON rejections.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parses an optional JSON body, falling back to `T::default()` when the
/// body is empty or `null`.
pub fn optional_json<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice::<Option<T>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")).into())
}
