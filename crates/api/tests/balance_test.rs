//! Balance, withdrawal and history over HTTP.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use rstest::rstest;

const WITHDRAW: &str = "/api/user/balance/withdraw";

#[tokio::test]
async fn test_new_user_has_empty_balance_and_history() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;

    let balance = app.get("/api/user/balance", Some(&token)).await;
    let history = app.get("/api/user/withdrawals", Some(&token)).await;
    let nested = app.get("/api/user/balance/withdrawals", Some(&token)).await;

    assert_eq!(balance.status, StatusCode::OK);
    assert_eq!(balance.json()["current"], 0.0);
    assert_eq!(balance.json()["withdrawn"], 0.0);
    assert_eq!(history.status, StatusCode::NO_CONTENT);
    assert_eq!(nested.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_withdraw_moves_points_and_is_listed() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;
    app.fund("alice", 50_000).await;

    let response = app
        .post_json(
            WITHDRAW,
            Some(&token),
            r#"{"order":"2377225624","sum":300.5}"#,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let balance = app.get("/api/user/balance", Some(&token)).await.json();
    assert_eq!(balance["current"], 199.5);
    assert_eq!(balance["withdrawn"], 300.5);

    for path in ["/api/user/withdrawals", "/api/user/balance/withdrawals"] {
        let history = app.get(path, Some(&token)).await;
        assert_eq!(history.status, StatusCode::OK);
        let items = history.json();
        assert_eq!(items.as_array().unwrap().len(), 1);
        assert_eq!(items[0]["order"], "2377225624");
        assert_eq!(items[0]["sum"], 300.5);
        assert!(items[0]["processed_at"].is_string());
    }
}

#[rstest]
#[case::insufficient(r#"{"order":"2377225624","sum":501}"#, StatusCode::PAYMENT_REQUIRED)]
#[case::bad_luhn(r#"{"order":"2377225625","sum":1}"#, StatusCode::UNPROCESSABLE_ENTITY)]
#[case::zero(r#"{"order":"2377225624","sum":0}"#, StatusCode::BAD_REQUEST)]
#[case::negative(r#"{"order":"2377225624","sum":-5}"#, StatusCode::BAD_REQUEST)]
#[case::too_precise(r#"{"order":"2377225624","sum":1.005}"#, StatusCode::BAD_REQUEST)]
#[case::not_json("order=2377225624", StatusCode::BAD_REQUEST)]
#[case::missing_sum(r#"{"order":"2377225624"}"#, StatusCode::BAD_REQUEST)]
#[tokio::test]
async fn test_rejected_withdrawal_changes_nothing(
    #[case] body: &str,
    #[case] expected: StatusCode,
) {
    let app = TestApp::new().await;
    let token = app.register("alice").await;
    app.fund("alice", 50_000).await;

    let response = app.post_json(WITHDRAW, Some(&token), body).await;

    assert_eq!(response.status, expected);
    let balance = app.get("/api/user/balance", Some(&token)).await.json();
    assert_eq!(balance["current"], 500.0);
    assert_eq!(balance["withdrawn"], 0.0);
}

#[tokio::test]
async fn test_withdrawal_number_cannot_be_reused() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;
    app.fund("alice", 50_000).await;
    app.post_text("/api/user/orders", &token, "12345678903").await;
    app.post_json(WITHDRAW, Some(&token), r#"{"order":"2377225624","sum":1}"#)
        .await;

    let reused = app
        .post_json(WITHDRAW, Some(&token), r#"{"order":"2377225624","sum":1}"#)
        .await;
    let order_number = app
        .post_json(WITHDRAW, Some(&token), r#"{"order":"12345678903","sum":1}"#)
        .await;

    assert_eq!(reused.status, StatusCode::CONFLICT);
    assert_eq!(order_number.status, StatusCode::CONFLICT);
    let balance = app.get("/api/user/balance", Some(&token)).await.json();
    assert_eq!(balance["current"], 499.0);
    assert_eq!(balance["withdrawn"], 1.0);
}
