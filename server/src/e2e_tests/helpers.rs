//! Common helpers for end-to-end tests.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{self, AppState};
use crate::auth::{DEFAULT_TOKEN_LIFETIME, TokenService};
use crate::store::{MemoryStore, Store};
use crate::testing::{ManualTimeSource, fast_hasher};

pub const TEST_SECRET: &[u8] = b"e2e-test-secret";

/// A response with its body decoded as JSON.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `error` field of an error body.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// The full router over a fresh store and a manual clock.
pub struct TestClient {
    pub router: Router,
    pub runtime: tokio::runtime::Runtime,
    pub time: Arc<ManualTimeSource>,
}

impl TestClient {
    /// Create a client over a fresh in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Create a client over the given store.
    #[must_use]
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let time = Arc::new(ManualTimeSource::default_start());

        #[allow(clippy::expect_used)]
        let tokens = TokenService::new(TEST_SECRET, DEFAULT_TOKEN_LIFETIME, time.clone())
            .expect("Failed to create token service");
        let state = AppState::new(store, fast_hasher(), Arc::new(tokens), time.clone());

        #[allow(clippy::expect_used)]
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");

        Self {
            router: api::router(state),
            runtime,
            time,
        }
    }

    /// Send a request and decode the response.
    pub fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        #[allow(clippy::expect_used)]
        let request = request.body(body).expect("Failed to build request");
        self.send_raw(request)
    }

    /// Send a prebuilt request and decode the response.
    pub fn send_raw(&self, request: Request<Body>) -> TestResponse {
        self.runtime.block_on(async {
            #[allow(clippy::expect_used)]
            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .expect("Router is infallible");
            let status = response.status();

            #[allow(clippy::expect_used)]
            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("Failed to read body");
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };

            TestResponse { status, body }
        })
    }

    /// Register an account and return its token and user id.
    pub fn register(&self, name: &str, email: &str, password: &str) -> (String, u64) {
        let response = self.send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        );
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        session_parts(&response)
    }

    /// Log in and return the token and user id.
    pub fn login(&self, email: &str, password: &str) -> (String, u64) {
        let response = self.send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        );
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        session_parts(&response)
    }

    /// Create a note and return its id.
    pub fn create_note(&self, token: &str, title: &str, content: &str) -> u64 {
        let response = self.send(
            Method::POST,
            "/api/v1/notes",
            Some(token),
            Some(json!({ "title": title, "content": content })),
        );
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        #[allow(clippy::expect_used)]
        response.body["id"].as_u64().expect("note id")
    }
}

fn session_parts(response: &TestResponse) -> (String, u64) {
    #[allow(clippy::expect_used)]
    let token = response.body["token"].as_str().expect("token").to_string();
    #[allow(clippy::expect_used)]
    let id = response.body["user"]["id"].as_u64().expect("user id");
    (token, id)
}

/// Path of a single note.
#[must_use]
pub fn note_path(id: u64) -> String {
    format!("/api/v1/notes/{id}")
}
