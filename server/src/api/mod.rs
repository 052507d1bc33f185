//! HTTP surface of the notes server.
//!
//! Routes, request bodies and response shapes live here. Handlers parse the
//! request, hand the typed input to [`AccountService`] or [`NoteService`] on
//! the blocking pool, and map the outcome through [`ApiError`].
//!
//! # Routes
//!
//! - `POST /api/v1/auth/register`, `POST /api/v1/auth/login` (public)
//! - `POST|GET /api/v1/notes[/]`, `GET|PUT|DELETE /api/v1/notes/{id}` (bearer token)

mod auth;
mod error;
mod extract;
mod notes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::accounts::AccountService;
use crate::auth::{AuthorizationGate, CredentialHasher, TokenService};
use crate::notes::NoteService;
use crate::store::Store;
use crate::time::TimeSource;

pub use error::{ApiError, NOTE_NOT_FOUND_MESSAGE};
pub use extract::Authorized;

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub notes: Arc<NoteService>,
    pub gate: Arc<AuthorizationGate>,
}

impl AppState {
    /// Wire the services around one store, one token service and one clock.
    #[must_use]
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
    pub fn new(
        store: Arc<dyn Store>,
        hasher: CredentialHasher,
        tokens: Arc<TokenService>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(
                Arc::clone(&store),
                hasher,
                Arc::clone(&tokens),
                Arc::clone(&time),
            )),
            notes: Arc::new(NoteService::new(Arc::clone(&store), time)),
            gate: Arc::new(AuthorizationGate::new(tokens, store)),
        }
    }
}

/// Message for a path that matches no route.
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";

/// Build the application router.
///
/// The collection path answers with and without a trailing slash. Unmatched
/// paths get a JSON 404 like every other error.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    Router::new()
        .nest("/api/v1/auth", auth_routes)
        .route(
            "/api/v1/notes",
            post(notes::create_note).get(notes::list_notes),
        )
        .route(
            "/api/v1/notes/",
            post(notes::create_note).get(notes::list_notes),
        )
        .route(
            "/api/v1/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound(ROUTE_NOT_FOUND_MESSAGE)
}

/// Run blocking work (Argon2, store calls) off the async workers.
///
/// # Errors
/// Returns the closure's error converted into an `ApiError`, or
/// `ApiError::Internal` if the task panicked or was cancelled.
pub(crate) async fn run_blocking<T, E, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(Into::into),
        Err(e) => {
            tracing::error!("blocking task failed: {e}");
            Err(ApiError::Internal)
        }
    }
}
