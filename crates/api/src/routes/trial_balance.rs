//! Trial balance report route.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use bursar_shared::types::TenantId;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery};

/// Creates the trial balance route (requires the actor middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/tenants/{tenant_id}/trial-balance", get(get_trial_balance))
}

/// Query parameters for the trial balance.
#[derive(Debug, Deserialize)]
pub struct TrialBalanceQuery {
    /// First day of the range (inclusive).
    pub from: NaiveDate,
    /// Last day of the range (inclusive).
    pub to: NaiveDate,
}

/// GET `/tenants/{tenant_id}/trial-balance?from&to` - Posted-only trial balance.
async fn get_trial_balance(
    State(state): State<AppState>,
    ApiPath(tenant_id): ApiPath<TenantId>,
    ApiQuery(query): ApiQuery<TrialBalanceQuery>,
) -> ApiResult<impl IntoResponse> {
    let report = state
        .ledger
        .closing()
        .generate_trial_balance(tenant_id, query.from, query.to)
        .await?;
    Ok(Json(report))
}
