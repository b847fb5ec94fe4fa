//! Acting-user middleware for ledger routes.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bursar_shared::AppError;
use bursar_shared::types::UserId;

use crate::error::ApiError;

/// Header naming the user on whose behalf a request acts.
pub const ACTOR_HEADER: &str = "x-user-id";

fn parse_actor(headers: &HeaderMap) -> Result<UserId, AppError> {
    let value = headers
        .get(ACTOR_HEADER)
        .ok_or_else(|| AppError::Unauthorized(format!("{ACTOR_HEADER} header is required")))?;

    value
        .to_str()
        .ok()
        .and_then(|raw| raw.trim().parse::<UserId>().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("{ACTOR_HEADER} must be a UUID")))
}

/// Middleware that identifies the acting user.
///
/// Rejects the request with 401 when the header is missing or is not a UUID,
/// otherwise stores the [`UserId`] in request extensions for [`Actor`].
pub async fn actor_middleware(mut request: Request, next: Next) -> Response {
    match parse_actor(request.headers()) {
        Ok(user_id) => {
            request.extensions_mut().insert(user_id);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Extractor for the acting user.
///
/// ```ignore
/// async fn handler(actor: Actor) -> impl IntoResponse {
///     let user_id = actor.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub UserId);

impl Actor {
    /// Returns the acting user's id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user_id) = parts.extensions.get::<UserId>() {
            return Ok(Actor(*user_id));
        }
        parse_actor(&parts.headers).map(Actor).map_err(ApiError::from)
    }
}
