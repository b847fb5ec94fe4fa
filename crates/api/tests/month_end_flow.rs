//! Month-end workflow through the public router.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bursar_api::{AppState, create_router};
use bursar_core::{Ledger, LedgerSettings};
use bursar_shared::types::{TenantId, UserId};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn call(app: &Router, user: UserId, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user.to_string())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_month_end_close_with_configured_retained_earnings() {
    let settings = LedgerSettings {
        retained_earnings_code: Some("3100".into()),
        ..LedgerSettings::default()
    };
    let app = create_router(AppState::new(Ledger::in_memory(settings)));
    let tenant = TenantId::new();
    let clerk = UserId::new();
    let controller = UserId::new();
    let base = format!("/api/v1/tenants/{tenant}");

    for (code, name, account_type) in [
        ("1000", "Cash", "asset"),
        ("1200", "Student Receivables", "asset"),
        ("3100", "Retained Earnings", "equity"),
        ("4000", "Tuition Revenue", "income"),
        ("5000", "Salaries Expense", "expense"),
    ] {
        let (status, _) = call(
            &app,
            controller,
            "POST",
            &format!("{base}/accounts"),
            json!({ "code": code, "name": name, "account_type": account_type }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, period) = call(
        &app,
        controller,
        "POST",
        &format!("{base}/periods"),
        json!({
            "name": "March 2025",
            "kind": "month",
            "start_date": "2025-03-01",
            "end_date": "2025-03-31"
        }),
    )
    .await;
    let period_id = period["id"].as_str().unwrap().to_string();

    for (date, debit, credit, amount) in [
        ("2025-03-03", "1200", "4000", "12000.00"),
        ("2025-03-15", "1000", "1200", "7000.00"),
        ("2025-03-28", "5000", "1000", "4500.00"),
    ] {
        let (status, draft) = call(
            &app,
            clerk,
            "POST",
            &format!("{base}/journal-entries"),
            json!({
                "date": date,
                "description": "March activity",
                "lines": [
                    { "account_code": debit, "debit": amount },
                    { "account_code": credit, "credit": amount }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, posted) = call(
            &app,
            controller,
            "POST",
            &format!("{base}/journal-entries/{}/post", draft["id"].as_str().unwrap()),
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{posted}");
        assert_eq!(posted["created_by"], clerk.to_string());
        assert_eq!(posted["approved_by"], controller.to_string());
    }

    let (status, outcome) = call(
        &app,
        controller,
        "POST",
        &format!("{base}/periods/{period_id}/close"),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["period"]["status"], "closed");
    assert_eq!(outcome["closing_entry"]["date"], "2025-03-31");

    let (_, accounts) = call(&app, controller, "GET", &format!("{base}/accounts"), Value::Null).await;
    let balance_of = |code: &str| {
        accounts["accounts"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["code"] == code)
            .map(|a| decimal(&a["balance"]))
            .unwrap()
    };
    assert_eq!(balance_of("4000"), Decimal::ZERO);
    assert_eq!(balance_of("5000"), Decimal::ZERO);
    assert_eq!(balance_of("3100"), dec!(7500));
    assert_eq!(balance_of("1000"), dec!(2500));
    assert_eq!(balance_of("1200"), dec!(5000));

    let (status, report) = call(
        &app,
        controller,
        "GET",
        &format!("{base}/trial-balance?from=2025-03-01&to=2025-03-31"),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totals"]["is_balanced"], true);
}
