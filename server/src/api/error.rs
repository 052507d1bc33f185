//! Translation of domain errors into HTTP responses.
//!
//! The only place a status code is chosen. Internal details are logged here
//! and replaced by a generic message before they reach the client.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::accounts::AccountError;
use crate::auth::Rejection;
use crate::auth::gate::INTERNAL_ERROR_MESSAGE;
use crate::notes::NoteError;

/// Message returned for any note the caller cannot see.
pub const NOTE_NOT_FOUND_MESSAGE: &str = "Note not found";

/// An error ready to be sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// The request is malformed or violates a policy (400).
    BadRequest(&'static str),
    /// The credentials are wrong (401).
    Unauthorized(&'static str),
    /// The resource does not exist or belongs to someone else (404).
    NotFound(&'static str),
    /// The request conflicts with existing state (409).
    Conflict(&'static str),
    /// The authorization gate refused the request.
    Rejected(Rejection),
    /// A dependency failed (500).
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl ApiError {
    /// Replace a JSON extractor failure with a generic message.
    pub fn invalid_body(rejection: &JsonRejection) -> Self {
        tracing::debug!("rejecting request body: {rejection}");
        Self::BadRequest("Invalid request body")
    }

    /// Status code and client-visible message.
    #[must_use]
    pub const fn parts(&self) -> (StatusCode, &'static str) {
        match *self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Rejected(rejection) => (rejection.status, rejection.message),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Validation(message) => Self::BadRequest(message),
            AccountError::EmailTaken => Self::Conflict("User with this email already exists"),
            AccountError::InvalidCredentials => Self::Unauthorized("Invalid credentials"),
            AccountError::Hashing(_) | AccountError::Token(_) | AccountError::Store(_) => {
                tracing::error!("account operation failed: {e}");
                Self::Internal
            }
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(e: NoteError) -> Self {
        match e {
            NoteError::Validation(message) => Self::BadRequest(message),
            NoteError::NotFound => Self::NotFound(NOTE_NOT_FOUND_MESSAGE),
            NoteError::Store(_) => {
                tracing::error!("note operation failed: {e}");
                Self::Internal
            }
        }
    }
}
