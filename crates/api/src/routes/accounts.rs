//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bursar_core::accounts::{AccountFilter, AccountUpdate, NewAccount};
use bursar_shared::types::TenantId;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::actor::Actor;

/// Creates the account routes (requires the actor middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/accounts",
            get(list_accounts).post(create_account),
        )
        .route(
            "/tenants/{tenant_id}/accounts/{code}",
            get(get_account).patch(update_account),
        )
        .route(
            "/tenants/{tenant_id}/accounts/{code}/deactivate",
            post(deactivate_account),
        )
        .route(
            "/tenants/{tenant_id}/accounts/{code}/reactivate",
            post(reactivate_account),
        )
        .route(
            "/tenants/{tenant_id}/accounts/{code}/ledger",
            get(get_account_ledger),
        )
}

/// Query parameters for the general ledger of one account.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// First day of the range (inclusive).
    pub from: NaiveDate,
    /// Last day of the range (inclusive).
    pub to: NaiveDate,
}

/// GET `/tenants/{tenant_id}/accounts` - List accounts with balances.
async fn list_accounts(
    State(state): State<AppState>,
    ApiPath(tenant_id): ApiPath<TenantId>,
    ApiQuery(filter): ApiQuery<AccountFilter>,
) -> ApiResult<impl IntoResponse> {
    let accounts = state
        .ledger
        .accounts()
        .list_accounts(tenant_id, &filter)
        .await?;

    Ok((StatusCode::OK, Json(json!({ "accounts": accounts }))))
}

/// POST `/tenants/{tenant_id}/accounts` - Register an account.
async fn create_account(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(tenant_id): ApiPath<TenantId>,
    ApiJson(payload): ApiJson<NewAccount>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .ledger
        .accounts()
        .create_account(tenant_id, payload)
        .await?;

    info!(
        tenant_id = %tenant_id,
        user_id = %actor.user_id(),
        code = %account.code,
        "Account created via API"
    );

    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/tenants/{tenant_id}/accounts/{code}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    ApiPath((tenant_id, code)): ApiPath<(TenantId, String)>,
) -> ApiResult<impl IntoResponse> {
    let account = state.ledger.accounts().get_account(tenant_id, &code).await?;
    Ok(Json(account))
}

/// PATCH `/tenants/{tenant_id}/accounts/{code}` - Rename, retype or describe an account.
async fn update_account(
    State(state): State<AppState>,
    ApiPath((tenant_id, code)): ApiPath<(TenantId, String)>,
    ApiJson(payload): ApiJson<AccountUpdate>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .ledger
        .accounts()
        .update_account(tenant_id, &code, payload)
        .await?;
    Ok(Json(account))
}

/// POST `/tenants/{tenant_id}/accounts/{code}/deactivate`
async fn deactivate_account(
    State(state): State<AppState>,
    ApiPath((tenant_id, code)): ApiPath<(TenantId, String)>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .ledger
        .accounts()
        .deactivate_account(tenant_id, &code)
        .await?;
    Ok(Json(account))
}

/// POST `/tenants/{tenant_id}/accounts/{code}/reactivate`
async fn reactivate_account(
    State(state): State<AppState>,
    ApiPath((tenant_id, code)): ApiPath<(TenantId, String)>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .ledger
        .accounts()
        .reactivate_account(tenant_id, &code)
        .await?;
    Ok(Json(account))
}

/// GET `/tenants/{tenant_id}/accounts/{code}/ledger?from&to` - General ledger with running balance.
async fn get_account_ledger(
    State(state): State<AppState>,
    ApiPath((tenant_id, code)): ApiPath<(TenantId, String)>,
    ApiQuery(query): ApiQuery<LedgerQuery>,
) -> ApiResult<impl IntoResponse> {
    let ledger = state
        .ledger
        .projector()
        .get_ledger(tenant_id, &code, query.from, query.to)
        .await?;
    Ok(Json(ledger))
}
