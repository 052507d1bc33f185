//! Test the register, create, read, update, delete sequence end to end.

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_note_lifecycle() {
    let test = TestClient::new();
    let (token, user_id) = test.register("Alice", "alice@example.com", "secret1");

    let created = test.send(
        Method::POST,
        "/api/v1/notes",
        Some(&token),
        Some(json!({ "title": "Draft", "content": "first version" })),
    );
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["user_id"].as_u64(), Some(user_id));
    let id = created.body["id"].as_u64().expect("note id");

    let fetched = test.send(Method::GET, &note_path(id), Some(&token), None);
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);

    test.time.advance(60_000);
    let updated = test.send(
        Method::PUT,
        &note_path(id),
        Some(&token),
        Some(json!({ "content": "second version" })),
    );
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Draft");
    assert_eq!(updated.body["content"], "second version");
    assert_eq!(updated.body["created_at"], created.body["created_at"]);
    assert_ne!(updated.body["updated_at"], created.body["updated_at"]);

    let deleted = test.send(Method::DELETE, &note_path(id), Some(&token), None);
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Note deleted successfully");

    let gone = test.send(Method::GET, &note_path(id), Some(&token), None);
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let deleted_again = test.send(Method::DELETE, &note_path(id), Some(&token), None);
    assert_eq!(deleted_again.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_login_token_works_like_register_token() {
    let test = TestClient::new();
    let (register_token, _) = test.register("Alice", "alice@example.com", "secret1");
    let note = test.create_note(&register_token, "Shared", "");

    let (login_token, _) = test.login("alice@example.com", "secret1");
    let response = test.send(Method::GET, &note_path(note), Some(&login_token), None);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Shared");
}

#[test]
fn test_update_with_empty_fields_changes_nothing() {
    let test = TestClient::new();
    let (token, _) = test.register("Alice", "alice@example.com", "secret1");
    let id = test.create_note(&token, "Title", "Body");

    let response = test.send(
        Method::PUT,
        &note_path(id),
        Some(&token),
        Some(json!({ "title": "", "content": "" })),
    );

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Title");
    assert_eq!(response.body["content"], "Body");
}

#[test]
fn test_register_login_create_and_cross_user_delete() {
    let test = TestClient::new();
    let (t1, _) = test.register("Alice", "alice@example.com", "secret1");
    let (t2, _) = test.login("alice@example.com", "secret1");
    assert_ne!(t1, t2);
    for token in [&t1, &t2] {
        let response = test.send(Method::GET, "/api/v1/notes", Some(token), None);
        assert_eq!(response.status, StatusCode::OK);
    }

    let note = test.create_note(&t2, "Alice's note", "");
    let (mallory, _) = test.register("Mallory", "mallory@example.com", "secret1");

    let stolen = test.send(Method::DELETE, &note_path(note), Some(&mallory), None);
    assert_eq!(stolen.status, StatusCode::NOT_FOUND);

    let deleted = test.send(Method::DELETE, &note_path(note), Some(&t2), None);
    assert_eq!(deleted.status, StatusCode::OK);
}
