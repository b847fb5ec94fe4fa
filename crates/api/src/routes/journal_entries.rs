//! Journal entry routes: drafting, posting and reversing.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bursar_core::journal::{DraftInput, EntryFilter, EntryStatus, ReverseInput};
use bursar_shared::types::{JournalEntryId, PageRequest, TenantId};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::actor::Actor;

/// Creates the journal entry routes (requires the actor middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/journal-entries",
            get(list_entries).post(create_entry),
        )
        .route(
            "/tenants/{tenant_id}/journal-entries/{entry_id}",
            get(get_entry).put(update_entry).delete(discard_entry),
        )
        .route(
            "/tenants/{tenant_id}/journal-entries/{entry_id}/post",
            post(post_entry),
        )
        .route(
            "/tenants/{tenant_id}/journal-entries/{entry_id}/reverse",
            post(reverse_entry),
        )
}

/// Query parameters for listing journal entries.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Filter by status.
    pub status: Option<EntryStatus>,
    /// Entries dated on or after this day.
    pub from: Option<NaiveDate>,
    /// Entries dated on or before this day.
    pub to: Option<NaiveDate>,
    /// Entries touching this account.
    pub account_code: Option<String>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Entries per page (default: 20, max: 100).
    pub per_page: Option<u32>,
}

impl ListEntriesQuery {
    fn into_parts(self) -> (EntryFilter, PageRequest) {
        let defaults = PageRequest::default();
        let page = PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        };
        let filter = EntryFilter {
            status: self.status,
            from: self.from,
            to: self.to,
            account_code: self.account_code,
        };
        (filter, page)
    }
}

/// GET `/tenants/{tenant_id}/journal-entries` - List entries, paginated.
async fn list_entries(
    State(state): State<AppState>,
    ApiPath(tenant_id): ApiPath<TenantId>,
    ApiQuery(query): ApiQuery<ListEntriesQuery>,
) -> ApiResult<impl IntoResponse> {
    let (filter, page) = query.into_parts();
    let entries = state
        .ledger
        .journal()
        .list_entries(tenant_id, &filter)
        .await?;

    Ok(Json(page.paginate(entries)))
}

/// POST `/tenants/{tenant_id}/journal-entries` - Create a draft.
async fn create_entry(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(tenant_id): ApiPath<TenantId>,
    ApiJson(payload): ApiJson<DraftInput>,
) -> ApiResult<impl IntoResponse> {
    let entry = state
        .ledger
        .journal()
        .create_draft(tenant_id, actor.user_id(), payload)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET `/tenants/{tenant_id}/journal-entries/{entry_id}`
async fn get_entry(
    State(state): State<AppState>,
    ApiPath((tenant_id, entry_id)): ApiPath<(TenantId, JournalEntryId)>,
) -> ApiResult<impl IntoResponse> {
    let entry = state.ledger.journal().get_entry(tenant_id, entry_id).await?;
    Ok(Json(entry))
}

/// PUT `/tenants/{tenant_id}/journal-entries/{entry_id}` - Replace a draft's content.
async fn update_entry(
    State(state): State<AppState>,
    ApiPath((tenant_id, entry_id)): ApiPath<(TenantId, JournalEntryId)>,
    ApiJson(payload): ApiJson<DraftInput>,
) -> ApiResult<impl IntoResponse> {
    let entry = state
        .ledger
        .journal()
        .update_draft(tenant_id, entry_id, payload)
        .await?;
    Ok(Json(entry))
}

/// DELETE `/tenants/{tenant_id}/journal-entries/{entry_id}` - Discard a draft.
async fn discard_entry(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath((tenant_id, entry_id)): ApiPath<(TenantId, JournalEntryId)>,
) -> ApiResult<impl IntoResponse> {
    state
        .ledger
        .journal()
        .discard_draft(tenant_id, entry_id)
        .await?;

    info!(
        tenant_id = %tenant_id,
        entry_id = %entry_id,
        user_id = %actor.user_id(),
        "Draft discarded via API"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST `/tenants/{tenant_id}/journal-entries/{entry_id}/post` - Post a draft.
async fn post_entry(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath((tenant_id, entry_id)): ApiPath<(TenantId, JournalEntryId)>,
) -> ApiResult<impl IntoResponse> {
    let entry = state
        .ledger
        .journal()
        .post(tenant_id, entry_id, actor.user_id())
        .await?;
    Ok(Json(entry))
}

/// POST `/tenants/{tenant_id}/journal-entries/{entry_id}/reverse` - Reverse a posted entry.
async fn reverse_entry(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath((tenant_id, entry_id)): ApiPath<(TenantId, JournalEntryId)>,
    ApiJson(payload): ApiJson<ReverseInput>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .ledger
        .journal()
        .reverse(tenant_id, entry_id, actor.user_id(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
