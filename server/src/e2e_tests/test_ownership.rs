//! Test that one user can never see or change another user's notes.

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_other_user_gets_not_found() {
    let test = TestClient::new();
    let (alice, _) = test.register("Alice", "alice@example.com", "secret1");
    let (bob, _) = test.register("Bob", "bob@example.com", "secret1");
    let note = test.create_note(&alice, "Private", "for alice only");

    let get = test.send(Method::GET, &note_path(note), Some(&bob), None);
    let put = test.send(
        Method::PUT,
        &note_path(note),
        Some(&bob),
        Some(json!({ "title": "hijacked" })),
    );
    let delete = test.send(Method::DELETE, &note_path(note), Some(&bob), None);

    for response in [&get, &put, &delete] {
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error(), "Note not found");
    }

    let own = test.send(Method::GET, &note_path(note), Some(&alice), None);
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["title"], "Private");
}

#[test]
fn test_foreign_and_missing_notes_look_the_same() {
    let test = TestClient::new();
    let (alice, _) = test.register("Alice", "alice@example.com", "secret1");
    let (bob, _) = test.register("Bob", "bob@example.com", "secret1");
    let note = test.create_note(&alice, "Private", "");

    let foreign = test.send(Method::GET, &note_path(note), Some(&bob), None);
    let missing = test.send(Method::GET, &note_path(note + 100), Some(&bob), None);

    assert_eq!(foreign.status, missing.status);
    assert_eq!(foreign.body, missing.body);
}

#[test]
fn test_owner_comes_from_token_not_body() {
    let test = TestClient::new();
    let (alice, alice_id) = test.register("Alice", "alice@example.com", "secret1");
    let (_, bob_id) = test.register("Bob", "bob@example.com", "secret1");

    let response = test.send(
        Method::POST,
        "/api/v1/notes",
        Some(&alice),
        Some(json!({ "title": "Mine", "content": "", "user_id": bob_id })),
    );

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user_id"].as_u64(), Some(alice_id));
}

#[test]
fn test_list_excludes_other_users() {
    let test = TestClient::new();
    let (alice, _) = test.register("Alice", "alice@example.com", "secret1");
    let (bob, _) = test.register("Bob", "bob@example.com", "secret1");
    test.create_note(&alice, "a1", "");
    test.create_note(&bob, "b1", "");
    test.create_note(&bob, "b2", "");

    let response = test.send(Method::GET, "/api/v1/notes", Some(&alice), None);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["notes"][0]["title"], "a1");
}
