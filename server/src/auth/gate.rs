//! Per-request authorization gate.
//!
//! Turns the raw `Authorization` header of a request into an [`Identity`] or
//! a [`Rejection`].
//!
//! # State machine
//!
//! - no header → rejected (401, "Missing authorization header")
//! - header not `Bearer <token>` → rejected (401, generic)
//! - token invalid, tampered or expired → rejected (401, generic)
//! - token valid but the subject no longer exists → rejected (401, generic)
//! - store failure while resolving the subject → rejected (500)
//! - otherwise → authorized
//!
//! # Invariants
//! - An [`Identity`] is only ever built from a token that passed validation.
//! - Token-level failures all produce the same client-visible rejection.

use std::sync::Arc;

use axum::http::StatusCode;

use super::{TokenError, TokenService};
use crate::store::{Store, StoreError, UserId};

/// Scheme expected in front of the token.
const BEARER_SCHEME: &str = "Bearer";

/// Message for a request without an `Authorization` header.
pub const MISSING_HEADER_MESSAGE: &str = "Missing authorization header";
/// Message for every token-level failure.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";
/// Message for a dependency failure while authorizing.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// The authenticated subject of a request.
///
/// Fields are private: handlers can read the identity but cannot build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject_id: UserId,
    email: String,
}

impl Identity {
    pub(crate) const fn new(subject_id: UserId, email: String) -> Self {
        Self { subject_id, email }
    }

    /// The authenticated user's ID.
    #[must_use]
    pub const fn subject_id(&self) -> UserId {
        self.subject_id
    }

    /// The authenticated user's email as recorded in the token.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// A short-circuited request: status plus a client-safe message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: &'static str,
}

impl Rejection {
    const fn unauthorized(message: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
    }

    const fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR_MESSAGE,
        }
    }
}

/// Why a header was refused before any token validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderError {
    Missing,
    Malformed,
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts exactly `Bearer <token>`: case-sensitive scheme, a single space,
/// and a non-empty token without further spaces.
fn bearer_token(raw_header: Option<&str>) -> Result<&str, HeaderError> {
    let raw = raw_header.ok_or(HeaderError::Missing)?;
    match raw.split_once(' ') {
        Some((BEARER_SCHEME, token)) if !token.is_empty() && !token.contains(' ') => Ok(token),
        _ => Err(HeaderError::Malformed),
    }
}

/// Validates bearer tokens and resolves them to identities.
pub struct AuthorizationGate {
    tokens: Arc<TokenService>,
    store: Arc<dyn Store>,
}

impl AuthorizationGate {
    #[must_use]
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn Store>) -> Self {
        Self { tokens, store }
    }

    /// Authorize a request from its raw `Authorization` header.
    ///
    /// Signature and expiry are checked before the subject is looked up in
    /// the store. The lookup runs on the blocking pool.
    ///
    /// # Errors
    /// Returns a `Rejection` for any failure; see the module docs.
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    pub async fn authorize(&self, raw_header: Option<&str>) -> Result<Identity, Rejection> {
        let token = bearer_token(raw_header).map_err(|e| {
            tracing::debug!("rejecting request: {e:?} authorization header");
            match e {
                HeaderError::Missing => Rejection::unauthorized(MISSING_HEADER_MESSAGE),
                HeaderError::Malformed => Rejection::unauthorized(INVALID_TOKEN_MESSAGE),
            }
        })?;

        let subject = self.tokens.validate(token).map_err(|e: TokenError| {
            tracing::debug!("rejecting request: {e}");
            Rejection::unauthorized(INVALID_TOKEN_MESSAGE)
        })?;

        let store = Arc::clone(&self.store);
        let subject_id = subject.subject_id;
        let user = tokio::task::spawn_blocking(move || store.find_user(subject_id))
            .await
            .map_err(|e| {
                tracing::error!("subject lookup task failed: {e}");
                Rejection::internal()
            })?
            .map_err(|e: StoreError| {
                tracing::error!("subject lookup failed: {e}");
                Rejection::internal()
            })?;

        if user.is_none() {
            tracing::debug!("rejecting request: subject {subject_id} no longer exists");
            return Err(Rejection::unauthorized(INVALID_TOKEN_MESSAGE));
        }

        Ok(Identity::new(subject.subject_id, subject.email))
    }
}
