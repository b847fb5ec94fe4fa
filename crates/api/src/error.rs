//! Mapping of ledger and request errors onto JSON responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bursar_core::LedgerError;
use bursar_shared::AppError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Any error a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A ledger rule or storage failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// A request-level failure (actor, path, query or body).
    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::App(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::App(e) => e.error_code(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Ledger(LedgerError::Store(_)) | Self::App(AppError::Internal(_)) => {
                "An error occurred".to_string()
            }
            Self::Ledger(e) => e.to_string(),
            Self::App(e) => e.to_string(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::App(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::App(AppError::Validation(rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::App(AppError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(status = %status, error_code = self.error_code(), "Request rejected");
        }

        (
            status,
            Json(json!({
                "error": self.error_code(),
                "message": self.message()
            })),
        )
            .into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
