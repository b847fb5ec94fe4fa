//! Helpers for driving the router in tests.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bursar_core::{Ledger, LedgerSettings};
use bursar_shared::types::{TenantId, UserId};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::middleware::actor::ACTOR_HEADER;
use crate::{AppState, create_router};

/// A router over a fresh in-memory ledger plus one tenant and user.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub tenant: TenantId,
    pub user: UserId,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(Ledger::in_memory(LedgerSettings::default()));
        Self {
            router: create_router(state.clone()),
            state,
            tenant: TenantId::new(),
            user: UserId::new(),
        }
    }

    /// Path under this app's tenant, e.g. `self.path("/accounts")`.
    pub fn path(&self, suffix: &str) -> String {
        format!("/api/v1/tenants/{}{suffix}", self.tenant)
    }

    /// Sends a request as the app's user and returns the status and JSON body.
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_HEADER, self.user.to_string());
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Registers the standard accounts and an open January 2025 period.
    pub async fn seed(&self) -> Value {
        for (code, name, account_type) in [
            ("1000", "Cash", "asset"),
            ("2000", "Accounts Payable", "liability"),
            ("3100", "Retained Earnings", "equity"),
            ("4000", "Tuition Revenue", "income"),
            ("5000", "Salaries Expense", "expense"),
        ] {
            let (status, _) = self
                .send(
                    "POST",
                    &self.path("/accounts"),
                    Some(json!({ "code": code, "name": name, "account_type": account_type })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, period) = self
            .send(
                "POST",
                &self.path("/periods"),
                Some(json!({
                    "name": "January 2025",
                    "kind": "month",
                    "start_date": "2025-01-01",
                    "end_date": "2025-01-31"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        period
    }

    /// Creates a two-line draft and returns its JSON.
    pub async fn draft(&self, date: &str, debit: &str, credit: &str, amount: &str) -> Value {
        let (status, entry) = self
            .send(
                "POST",
                &self.path("/journal-entries"),
                Some(json!({
                    "date": date,
                    "description": "Router test entry",
                    "lines": [
                        { "account_code": debit, "debit": amount },
                        { "account_code": credit, "credit": amount }
                    ]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{entry}");
        entry
    }

    /// Creates and posts a two-line entry and returns the posted JSON.
    pub async fn post_entry(&self, date: &str, debit: &str, credit: &str, amount: &str) -> Value {
        let draft = self.draft(date, debit, credit, amount).await;
        let id = draft["id"].as_str().unwrap().to_string();
        let (status, posted) = self
            .send("POST", &self.path(&format!("/journal-entries/{id}/post")), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{posted}");
        posted
    }
}
