mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use coinfolio_backend::{
    auth::{API_KEY_HEADER, USER_ID_HEADER},
    services::{balance, notification},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use crate::common::{build_test_router, create_test_state, create_user, fund, ADMIN_KEY};

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .map(|s| s.parse().unwrap())
        .or_else(|| value.as_f64().map(|f| Decimal::try_from(f).unwrap()))
        .expect("decimal field")
}

#[tokio::test]
async fn test_transfer_endpoint_happy_path() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let bob = create_user(&state.db, "bob").await;
    fund(&state, alice.id, "USD", dec!(100)).await;
    let server = TestServer::new(build_test_router(state.clone())).unwrap();

    let response = server
        .post("/api/transfer")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .json(&json!({ "recipientId": bob.id, "amount": 40 }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let txn_id = body["transactionId"].as_str().unwrap().to_string();
    assert!(txn_id.starts_with("TXN"));

    let balance = server
        .get("/api/balance")
        .add_header(USER_ID_HEADER, bob.id.to_string())
        .await;
    balance.assert_status(StatusCode::OK);
    let body: Value = balance.json();
    assert_eq!(body["currency"], "USD");
    assert_eq!(decimal(&body["balance"]), dec!(40));

    let details = server
        .get(&format!("/api/transfer-details/{}", txn_id))
        .add_header(USER_ID_HEADER, bob.id.to_string())
        .await;
    details.assert_status(StatusCode::OK);
    let body: Value = details.json();
    assert_eq!(body["direction"], "received");
    assert_eq!(body["counterparty"]["username"], "alice");
}

#[tokio::test]
async fn test_transfer_endpoint_error_mapping() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let bob = create_user(&state.db, "bob").await;
    fund(&state, alice.id, "USD", dec!(10)).await;
    let server = TestServer::new(build_test_router(state.clone())).unwrap();

    let insufficient = server
        .post("/api/transfer")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .json(&json!({ "recipientId": bob.id, "amount": "40" }))
        .await;
    insufficient.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = insufficient.json();
    assert_eq!(body["code"], "INSUFFICIENT_FUNDS");
    assert_eq!(decimal(&body["details"]["available"]), dec!(10));

    let zero = server
        .post("/api/transfer")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .json(&json!({ "recipientId": bob.id, "amount": 0 }))
        .await;
    zero.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(zero.json::<Value>()["code"], "INVALID_REQUEST");

    let to_self = server
        .post("/api/transfer")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .json(&json!({ "recipientId": alice.id, "amount": 1 }))
        .await;
    to_self.assert_status(StatusCode::BAD_REQUEST);

    let anonymous = server
        .post("/api/transfer")
        .json(&json!({ "recipientId": bob.id, "amount": 1 }))
        .await;
    anonymous.assert_status(StatusCode::UNAUTHORIZED);

    let malformed = server
        .post("/api/transfer")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .add_header("content-type", "application/json")
        .text("{not json")
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(
        balance::get_balance(&state.db, alice.id, "USD").await.unwrap(),
        dec!(10)
    );
}

#[tokio::test]
async fn test_transfer_disabled_maps_to_forbidden() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let bob = create_user(&state.db, "bob").await;
    fund(&state, alice.id, "USD", dec!(500)).await;
    let server = TestServer::new(build_test_router(state.clone())).unwrap();

    server
        .patch(&format!("/api/admin/users/{}/access", alice.id))
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({ "transferAccess": false }))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post("/api/transfer")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .json(&json!({ "recipientId": bob.id, "amount": 10 }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["code"], "TRANSFER_DISABLED");
}

#[tokio::test]
async fn test_history_and_notifications_endpoints() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let bob = create_user(&state.db, "bob").await;
    fund(&state, alice.id, "USD", dec!(100)).await;
    let server = TestServer::new(build_test_router(state.clone())).unwrap();

    server
        .post("/api/transfer")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .json(&json!({ "recipientId": bob.id, "amount": 12.5 }))
        .await
        .assert_status(StatusCode::OK);

    let history: Value = server
        .get("/api/transfer-history")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .await
        .json();
    let transfers = history["transfers"].as_array().unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0]["direction"], "sent");
    assert_eq!(transfers[0]["status"], "completed");

    let inbox: Value = server
        .get("/api/notifications")
        .add_query_param("unread", "true")
        .add_header(USER_ID_HEADER, bob.id.to_string())
        .await
        .json();
    assert_eq!(inbox["unreadCount"], 1);
    let note = &inbox["notifications"][0];
    assert_eq!(note["type"], "transfer_received");
    let note_id = note["id"].as_i64().unwrap();

    server
        .post(&format!("/api/notifications/{}/read", note_id))
        .add_header(USER_ID_HEADER, bob.id.to_string())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(notification::unread_count(&state.db, bob.id).await.unwrap(), 0);

    // Alice cannot touch Bob's notification
    server
        .post(&format!("/api/notifications/{}/read", note_id))
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let read_all: Value = server
        .post("/api/notifications/read-all")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .await
        .json();
    assert_eq!(read_all["success"], true);
    assert_eq!(read_all["updated"], 2);
}

#[tokio::test]
async fn test_admin_routes_require_api_key() {
    let state = create_test_state().await;
    create_user(&state.db, "alice").await;
    let server = TestServer::new(build_test_router(state)).unwrap();

    server.get("/api/admin/users").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/admin/users")
        .add_header(API_KEY_HEADER, "wrong")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/admin/users")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["users"][0]["username"], "alice");
    assert_eq!(body["users"][0]["transferAccess"], true);
    assert!(body["users"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_admin_without_configured_key_fails_closed() {
    let mut state = create_test_state().await;
    let mut config = (*state.config).clone();
    config.admin_api_key = None;
    state.config = std::sync::Arc::new(config);
    let server = TestServer::new(build_test_router(state)).unwrap();

    let response = server
        .get("/api/admin/users")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["code"], "CONFIG_ERROR");
}

#[tokio::test]
async fn test_admin_funding_and_user_withdrawal() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let server = TestServer::new(build_test_router(state.clone())).unwrap();

    let deposit = server
        .post("/api/admin/deposits")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({ "userId": alice.id, "amount": "250.75" }))
        .await;
    deposit.assert_status(StatusCode::OK);
    let body: Value = deposit.json();
    assert!(body["reference"].as_str().unwrap().starts_with("DEP"));
    assert_eq!(decimal(&body["balance"]), dec!(250.75));

    let withdraw = server
        .post("/api/withdraw")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .json(&json!({ "amount": 50.75, "destination": "IBAN-1" }))
        .await;
    withdraw.assert_status(StatusCode::OK);
    let body: Value = withdraw.json();
    assert!(body["reference"].as_str().unwrap().starts_with("WDR"));
    assert_eq!(decimal(&body["balance"]), dec!(200));

    let admin_withdraw = server
        .post("/api/admin/withdrawals")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({ "userId": alice.id, "amount": 500 }))
        .await;
    admin_withdraw.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(admin_withdraw.json::<Value>()["code"], "INSUFFICIENT_FUNDS");

    let me: Value = server
        .get("/api/me")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .await
        .json();
    assert_eq!(me["user"]["username"], "alice");
    assert_eq!(me["balances"][0]["currency"], "USD");
    assert_eq!(decimal(&me["balances"][0]["balance"]), dec!(200));
}

#[tokio::test]
async fn test_admin_system_message() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let server = TestServer::new(build_test_router(state.clone())).unwrap();

    let response = server
        .post(&format!("/api/admin/users/{}/message", alice.id))
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({ "title": "Notice", "message": "Scheduled maintenance" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["type"], "system");

    server
        .post("/api/admin/users/9999/message")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({ "title": "Notice", "message": "Hello" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_creates_account_that_can_authenticate() {
    let state = create_test_state().await;
    let server = TestServer::new(build_test_router(state)).unwrap();

    let response = server
        .post("/api/admin/users")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({
            "username": "dave",
            "email": "Dave@Example.com",
            "passwordHash": "$argon2id$hash"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["username"], "dave");
    assert_eq!(created["email"], "dave@example.com");
    assert_eq!(created["isAdmin"], false);
    assert_eq!(created["uid"].as_str().unwrap().len(), 9);
    assert!(created.get("passwordHash").is_none());
    let id = created["id"].as_i64().unwrap();

    let me = server
        .get("/api/me")
        .add_header(USER_ID_HEADER, id.to_string())
        .await;
    me.assert_status(StatusCode::OK);
    assert_eq!(me.json::<Value>()["user"]["username"], "dave");

    let duplicate = server
        .post("/api/admin/users")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({
            "username": "dave",
            "email": "other@example.com",
            "passwordHash": "x"
        }))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.json::<Value>()["code"], "INVALID_REQUEST");

    let incomplete = server
        .post("/api/admin/users")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({ "username": "erin", "email": "erin@example.com" }))
        .await;
    incomplete.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(incomplete.json::<Value>()["code"], "INVALID_REQUEST");

    server
        .post("/api/admin/users")
        .json(&json!({ "username": "mallory", "email": "m@example.com", "passwordHash": "x" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_path_and_query_use_error_body() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let server = TestServer::new(build_test_router(state)).unwrap();

    let bad_path = server
        .post("/api/notifications/abc/read")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .await;
    bad_path.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = bad_path.json();
    assert_eq!(body["code"], "INVALID_REQUEST");
    assert!(body["error"].is_string());

    let bad_query = server
        .get("/api/notifications")
        .add_header(USER_ID_HEADER, alice.id.to_string())
        .add_query_param("limit", "many")
        .await;
    bad_query.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_query.json::<Value>()["code"], "INVALID_REQUEST");

    let bad_admin_path = server
        .patch("/api/admin/users/xyz/access")
        .add_header(API_KEY_HEADER, ADMIN_KEY)
        .json(&json!({ "transferAccess": false }))
        .await;
    bad_admin_path.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_admin_path.json::<Value>()["code"], "INVALID_REQUEST");
}
