//! Typed identity extractor.
//!
//! Handlers that take an [`Authorized`] argument only run after the
//! authorization gate accepted the request; the identity inside comes from
//! the validated token and nothing else.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::{ApiError, AppState};
use crate::auth::Identity;

/// The identity of an authorized request.
#[derive(Debug, Clone)]
pub struct Authorized(pub Identity);

impl FromRequestParts<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A header that is not visible ASCII cannot be a bearer token; pass an
        // empty value so it is rejected as malformed rather than missing.
        let raw_header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default());

        let identity = state.gate.authorize(raw_header).await?;
        Ok(Self(identity))
    }
}
