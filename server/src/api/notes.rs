//! Note handlers.
//!
//! Every handler takes [`Authorized`], so none of them runs for a rejected
//! request.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, Authorized, NOTE_NOT_FOUND_MESSAGE, run_blocking};
use crate::notes::NoteChanges;
use crate::store::{Note, NoteFilter, NoteId, NotePage};

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    title: Option<String>,
    content: Option<String>,
}

/// Raw list parameters; invalid values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

/// Parse a path id. Anything that is not a note id cannot name one of the
/// caller's notes, so it is reported as not found.
fn parse_note_id(raw: &str) -> Result<NoteId, ApiError> {
    raw.parse::<NoteId>().map_err(|e| {
        tracing::debug!("rejecting note id: {e}");
        ApiError::NotFound(NOTE_NOT_FOUND_MESSAGE)
    })
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
pub async fn create_note(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    body: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::invalid_body(&e))?;
    let notes = Arc::clone(&state.notes);

    let note = run_blocking(move || notes.create(&identity, &request.title, &request.content))
        .await?;

    Ok((StatusCode::CREATED, Json(note)))
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
pub async fn list_notes(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<NotePage>, ApiError> {
    // A query string that does not deserialize at all (a repeated key, for
    // instance) gets the same treatment as unparsable values.
    let params = query.map_or_else(
        |e| {
            tracing::debug!("ignoring list parameters: {e}");
            ListParams::default()
        },
        |Query(params)| params,
    );
    let filter = NoteFilter::from_query(
        params.page.as_deref(),
        params.limit.as_deref(),
        params.search.as_deref(),
    );
    let notes = Arc::clone(&state.notes);

    let page = run_blocking(move || notes.list(&identity, &filter)).await?;

    Ok(Json(page))
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
pub async fn get_note(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let notes = Arc::clone(&state.notes);

    let note = run_blocking(move || notes.get(&identity, id)).await?;

    Ok(Json(note))
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
pub async fn update_note(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    Path(id): Path<String>,
    body: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let Json(request) = body.map_err(|e| ApiError::invalid_body(&e))?;
    let changes = NoteChanges {
        title: request.title,
        content: request.content,
    };
    let notes = Arc::clone(&state.notes);

    let note = run_blocking(move || notes.update(&identity, id, changes)).await?;

    Ok(Json(note))
}

#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
pub async fn delete_note(
    State(state): State<AppState>,
    Authorized(identity): Authorized,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_note_id(&id)?;
    let notes = Arc::clone(&state.notes);

    run_blocking(move || notes.delete(&identity, id)).await?;

    Ok(Json(MessageResponse {
        message: "Note deleted successfully",
    }))
}
