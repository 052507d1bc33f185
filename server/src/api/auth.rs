//! Registration and login handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;

use super::{ApiError, AppState, run_blocking};
use crate::accounts::AuthSession;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthSession>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::invalid_body(&e))?;
    let accounts = Arc::clone(&state.accounts);

    let session = run_blocking(move || {
        accounts.register(&request.name, &request.email, &request.password)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthSession>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::invalid_body(&e))?;
    let accounts = Arc::clone(&state.accounts);

    let session = run_blocking(move || accounts.login(&request.email, &request.password)).await?;

    Ok(Json(session))
}
