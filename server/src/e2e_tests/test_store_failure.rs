//! Test that a failing store surfaces as a generic 500.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::auth::{DEFAULT_TOKEN_LIFETIME, TokenService};
use crate::e2e_tests::helpers::*;
use crate::store::UserId;
use crate::testing::FailingStore;

#[test]
fn test_register_store_failure() {
    let test = TestClient::with_store(Arc::new(FailingStore));

    let response = test.send(
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "Alice", "email": "alice@example.com", "password": "secret1" })),
    );

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error(), "Internal server error");
    assert!(!response.body.to_string().contains("backend unreachable"));
}

#[test]
fn test_gate_store_failure() {
    let test = TestClient::with_store(Arc::new(FailingStore));
    let tokens = TokenService::new(TEST_SECRET, DEFAULT_TOKEN_LIFETIME, test.time.clone())
        .expect("valid token service");
    let token = tokens
        .issue(UserId::new(1).expect("non-zero id"), "alice@example.com")
        .expect("issue");

    let response = test.send(Method::GET, "/api/v1/notes", Some(&token), None);

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error(), "Internal server error");
}
