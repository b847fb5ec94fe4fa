//! Accounting period routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bursar_core::closing::{ClosePeriodInput, NewPeriod};
use bursar_shared::types::{PeriodId, TenantId};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, optional_json};
use crate::middleware::actor::Actor;

/// Creates the period routes (requires the actor middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/periods",
            get(list_periods).post(create_period),
        )
        .route(
            "/tenants/{tenant_id}/periods/{period_id}/close",
            post(close_period),
        )
        .route(
            "/tenants/{tenant_id}/periods/{period_id}/reopen",
            post(reopen_period),
        )
        .route(
            "/tenants/{tenant_id}/periods/{period_id}/lock",
            post(lock_period),
        )
}

/// Optional body for reopening a period.
#[derive(Debug, Default, Deserialize)]
pub struct ReopenRequest {
    /// Why the period is reopened.
    #[serde(default)]
    pub note: Option<String>,
}

/// GET `/tenants/{tenant_id}/periods` - List periods by start date.
async fn list_periods(
    State(state): State<AppState>,
    ApiPath(tenant_id): ApiPath<TenantId>,
) -> ApiResult<impl IntoResponse> {
    let periods = state.ledger.closing().list_periods(tenant_id).await?;
    Ok(Json(json!({ "periods": periods })))
}

/// POST `/tenants/{tenant_id}/periods` - Create an open period.
async fn create_period(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(tenant_id): ApiPath<TenantId>,
    ApiJson(payload): ApiJson<NewPeriod>,
) -> ApiResult<impl IntoResponse> {
    let period = state
        .ledger
        .closing()
        .create_period(tenant_id, actor.user_id(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// POST `/tenants/{tenant_id}/periods/{period_id}/close`
///
/// Body is optional: `{"retained_earnings_code": "3100"}`.
async fn close_period(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath((tenant_id, period_id)): ApiPath<(TenantId, PeriodId)>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let input: ClosePeriodInput = optional_json(&body)?;
    let outcome = state
        .ledger
        .closing()
        .close_period(tenant_id, period_id, actor.user_id(), input)
        .await?;
    Ok(Json(outcome))
}

/// POST `/tenants/{tenant_id}/periods/{period_id}/reopen`
async fn reopen_period(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath((tenant_id, period_id)): ApiPath<(TenantId, PeriodId)>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let request: ReopenRequest = optional_json(&body)?;
    let period = state
        .ledger
        .closing()
        .reopen_period(tenant_id, period_id, actor.user_id(), request.note)
        .await?;
    Ok(Json(period))
}

/// POST `/tenants/{tenant_id}/periods/{period_id}/lock`
async fn lock_period(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath((tenant_id, period_id)): ApiPath<(TenantId, PeriodId)>,
) -> ApiResult<impl IntoResponse> {
    let period = state
        .ledger
        .closing()
        .lock_period(tenant_id, period_id, actor.user_id())
        .await?;
    Ok(Json(period))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_overlapping_period_conflicts() {
        let app = TestApp::new();
        app.seed().await;

        let (status, body) = app
            .send(
                "POST",
                &app.path("/periods"),
                Some(json!({
                    "name": "Q1 2025",
                    "kind": "quarter",
                    "start_date": "2025-01-15",
                    "end_date": "2025-03-31"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "OVERLAPPING_PERIOD");
    }

    #[tokio::test]
    async fn test_inverted_range_is_bad_request() {
        let app = TestApp::new();

        let (status, body) = app
            .send(
                "POST",
                &app.path("/periods"),
                Some(json!({
                    "name": "Backwards",
                    "kind": "month",
                    "start_date": "2025-02-28",
                    "end_date": "2025-02-01"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_DATE_RANGE");
    }

    #[tokio::test]
    async fn test_close_reopen_and_lock() {
        let app = TestApp::new();
        let period = app.seed().await;
        let id = period["id"].as_str().unwrap();
        app.post_entry("2025-01-10", "1000", "4000", "900").await;

        let (status, body) = app
            .send("POST", &app.path(&format!("/periods/{id}/close")), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["period"]["status"], "closed");
        assert_eq!(body["trial_balance"]["totals"]["is_balanced"], true);
        assert!(body["closing_entry"].is_null());

        let draft = app.draft("2025-01-20", "1000", "4000", "5").await;
        let (status, body) = app
            .send(
                "POST",
                &app.path(&format!(
                    "/journal-entries/{}/post",
                    draft["id"].as_str().unwrap()
                )),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "PERIOD_CLOSED");

        let (status, body) = app
            .send(
                "POST",
                &app.path(&format!("/periods/{id}/reopen")),
                Some(json!({ "note": "Audit adjustment" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "open");

        let (status, body) = app
            .send("POST", &app.path(&format!("/periods/{id}/lock")), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "PERIOD_NOT_CLOSED");
    }

    #[tokio::test]
    async fn test_close_with_retained_earnings_posts_closing_entry() {
        let app = TestApp::new();
        let period = app.seed().await;
        let id = period["id"].as_str().unwrap();
        app.post_entry("2025-01-05", "1000", "4000", "800").await;
        app.post_entry("2025-01-20", "5000", "1000", "300").await;

        let (status, body) = app
            .send(
                "POST",
                &app.path(&format!("/periods/{id}/close")),
                Some(json!({ "retained_earnings_code": "3100" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["closing_entry"]["status"], "posted");

        let (_, equity) = app.send("GET", &app.path("/accounts/3100"), None).await;
        let balance: rust_decimal::Decimal = equity["balance"].as_str().unwrap().parse().unwrap();
        assert_eq!(balance, rust_decimal_macros::dec!(500));
    }

    #[tokio::test]
    async fn test_unbalanced_draft_blocks_close() {
        let app = TestApp::new();
        let period = app.seed().await;
        let id = period["id"].as_str().unwrap();
        app.send(
            "POST",
            &app.path("/journal-entries"),
            Some(json!({
                "date": "2025-01-25",
                "description": "Half-finished accrual",
                "lines": [
                    { "account_code": "5000", "debit": "500" },
                    { "account_code": "2000", "credit": "400" }
                ]
            })),
        )
        .await;

        let (status, body) = app
            .send("POST", &app.path(&format!("/periods/{id}/close")), None)
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "UNBALANCED_PERIOD");

        let (_, body) = app.send("GET", &app.path("/periods"), None).await;
        assert_eq!(body["periods"][0]["status"], "open");
    }
}
