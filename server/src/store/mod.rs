//! Storage collaborator.
//!
//! The [`Store`] trait is the only way the rest of the server reaches
//! persisted users and notes. One store is built at startup and shared as an
//! `Arc<dyn Store>`.
//!
//! # Invariants
//!
//! - Every note lookup, update and delete is keyed by `(id, owner)`; there is
//!   no way to fetch a note by id alone.
//! - A note's owner never changes after creation.
//! - Store calls may block; async callers run them on the blocking pool.

mod ids;
mod memory;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use ids::{IdParseError, NoteId, UserId};
pub use memory::MemoryStore;

/// A registered account and its credential.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Normalized (trimmed, lower-cased) email address. Unique.
    pub email: String,
    /// Argon2 PHC string. Never serialized or logged.
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The public view of this user, without the credential.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_digest", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// User fields safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user about to be created. The store assigns the ID.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

/// A note owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(rename = "user_id")]
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note about to be created. The store assigns the ID.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing a user's notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFilter {
    /// 1-based page number.
    pub page: u32,
    /// Page size, 1 to [`NoteFilter::MAX_LIMIT`].
    pub limit: u32,
    /// Case-insensitive substring matched against title or content.
    pub search: Option<String>,
}

impl NoteFilter {
    /// Page size used when none (or an invalid one) is requested.
    pub const DEFAULT_LIMIT: u32 = 10;
    /// Largest accepted page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Build a filter from raw query parameters.
    ///
    /// Unparsable or out-of-range values fall back to the defaults; an empty
    /// search string means no search.
    #[must_use]
    pub fn from_query(page: Option<&str>, limit: Option<&str>, search: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| (1..=i64::from(Self::MAX_LIMIT)).contains(l))
            .and_then(|l| u32::try_from(l).ok())
            .unwrap_or(Self::DEFAULT_LIMIT);
        let search = search
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);

        Self {
            page,
            limit,
            search,
        }
    }

    /// Number of matching notes skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.limit as usize
    }
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
            search: None,
        }
    }
}

/// One page of a user's notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePage {
    pub notes: Vec<Note>,
    /// Number of notes matching the filter across all pages.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Errors that can occur in the storage collaborator.
#[derive(Debug)]
pub enum StoreError {
    /// A user with this email already exists.
    DuplicateEmail,
    /// The store's lock was poisoned by a panicking writer.
    LockPoisoned,
    /// The store could not be reached or failed internally.
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEmail => write!(f, "a user with this email already exists"),
            Self::LockPoisoned => write!(f, "store lock poisoned"),
            Self::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Persistence for users and their notes.
///
/// Implementations must be safe to share across request tasks. Note
/// operations take the owner explicitly and must never match a note owned by
/// someone else.
pub trait Store: Send + Sync {
    /// Find a user by normalized email.
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by ID.
    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Create a user.
    ///
    /// # Errors
    /// Returns `StoreError::DuplicateEmail` if the email is taken.
    fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Find a note by ID among the owner's notes.
    fn find_note(&self, id: NoteId, owner: UserId) -> Result<Option<Note>, StoreError>;

    /// List one page of the owner's notes, newest first.
    fn list_notes(&self, owner: UserId, filter: &NoteFilter) -> Result<NotePage, StoreError>;

    /// Create a note.
    fn create_note(&self, note: NewNote) -> Result<Note, StoreError>;

    /// Overwrite the title, content and `updated_at` of a note.
    ///
    /// Matches on `(note.id, note.owner)`. Returns `false` if no such note exists.
    fn update_note(&self, note: &Note) -> Result<bool, StoreError>;

    /// Delete a note among the owner's notes. Returns the number of rows removed.
    fn delete_note(&self, id: NoteId, owner: UserId) -> Result<u64, StoreError>;
}
