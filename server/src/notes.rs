//! Note operations with ownership enforcement.
//!
//! Every operation takes the caller's [`Identity`] and only ever touches
//! notes owned by that identity.
//!
//! # Invariants
//! - A new note's owner comes from the identity, never from input.
//! - A note owned by someone else is reported exactly like a missing note.
//! - Every method may block on the store; async callers run it on the
//!   blocking pool.

use std::sync::Arc;

use crate::auth::Identity;
use crate::store::{NewNote, Note, NoteFilter, NoteId, NotePage, Store, StoreError};
use crate::time::TimeSource;

/// Requested changes to a note.
///
/// A field that is `None` or empty is left unchanged. A title made only of
/// whitespace is rejected with a validation error instead of being saved as
/// an empty title, the same rule `create` applies.
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Errors from note operations.
#[derive(Debug)]
pub enum NoteError {
    /// The input violates a note invariant.
    Validation(&'static str),
    /// No note with this ID is owned by the caller.
    NotFound,
    /// The store failed.
    Store(StoreError),
}

impl std::fmt::Display for NoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::NotFound => write!(f, "note not found"),
            Self::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for NoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Validation(_) | Self::NotFound => None,
        }
    }
}

impl From<StoreError> for NoteError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Creates, reads, updates and deletes the caller's notes.
pub struct NoteService {
    store: Arc<dyn Store>,
    time: Arc<dyn TimeSource>,
}

impl NoteService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, time: Arc<dyn TimeSource>) -> Self {
        Self { store, time }
    }

    /// Create a note owned by the caller.
    ///
    /// # Errors
    /// Returns `Validation` if the title is blank, `Store` on store failure.
    pub fn create(
        &self,
        identity: &Identity,
        title: &str,
        content: &str,
    ) -> Result<Note, NoteError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NoteError::Validation("Title is required"));
        }

        let note = self.store.create_note(NewNote {
            owner: identity.subject_id(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: self.time.now_utc(),
        })?;
        tracing::info!("user {} created note {}", note.owner, note.id);
        Ok(note)
    }

    /// Fetch one of the caller's notes.
    ///
    /// # Errors
    /// Returns `NotFound` if the caller owns no note with this ID.
    pub fn get(&self, identity: &Identity, id: NoteId) -> Result<Note, NoteError> {
        self.store
            .find_note(id, identity.subject_id())?
            .ok_or(NoteError::NotFound)
    }

    /// List one page of the caller's notes, newest first.
    ///
    /// # Errors
    /// Returns `Store` on store failure.
    pub fn list(&self, identity: &Identity, filter: &NoteFilter) -> Result<NotePage, NoteError> {
        Ok(self.store.list_notes(identity.subject_id(), filter)?)
    }

    /// Apply changes to one of the caller's notes.
    ///
    /// Empty-string fields are treated as "no change", so content cannot be
    /// cleared through this call.
    ///
    /// # Errors
    /// - `NotFound` if the caller owns no note with this ID.
    /// - `Validation` if a non-empty title is blank after trimming.
    pub fn update(
        &self,
        identity: &Identity,
        id: NoteId,
        changes: NoteChanges,
    ) -> Result<Note, NoteError> {
        let mut note = self.get(identity, id)?;

        if let Some(title) = changes.title.filter(|t| !t.is_empty()) {
            let title = title.trim();
            if title.is_empty() {
                return Err(NoteError::Validation("Title cannot be blank"));
            }
            title.clone_into(&mut note.title);
        }
        if let Some(content) = changes.content.filter(|c| !c.is_empty()) {
            note.content = content;
        }
        note.updated_at = self.time.now_utc();

        if !self.store.update_note(&note)? {
            // Deleted between the read and the write.
            return Err(NoteError::NotFound);
        }
        tracing::debug!("user {} updated note {}", note.owner, note.id);
        Ok(note)
    }

    /// Delete one of the caller's notes.
    ///
    /// # Errors
    /// Returns `NotFound` if the caller owns no note with this ID.
    pub fn delete(&self, identity: &Identity, id: NoteId) -> Result<(), NoteError> {
        let owner = identity.subject_id();
        if self.store.delete_note(id, owner)? == 0 {
            return Err(NoteError::NotFound);
        }
        tracing::info!("user {owner} deleted note {id}");
        Ok(())
    }
}
