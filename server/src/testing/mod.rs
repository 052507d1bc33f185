//! Shared test helpers.

use std::sync::atomic::{AtomicU64, Ordering};

use argon2::Params;

use crate::auth::CredentialHasher;
use crate::store::{
    NewNote, NewUser, Note, NoteFilter, NoteId, NotePage, Store, StoreError, User, UserId,
};
use crate::time::TimeSource;

/// A time source that only moves when told to.
///
/// Uses an atomic so it can be shared with services across the blocking pool.
#[derive(Debug)]
pub struct ManualTimeSource {
    /// Current time in milliseconds since Unix epoch.
    current_time_ms: AtomicU64,
}

impl ManualTimeSource {
    /// Create a time source starting at the given time.
    #[must_use]
    pub const fn new(initial_time_ms: u64) -> Self {
        Self {
            current_time_ms: AtomicU64::new(initial_time_ms),
        }
    }

    /// Start at `1_700_000_000_000` (approximately November 2023).
    #[must_use]
    pub const fn default_start() -> Self {
        Self::new(1_700_000_000_000)
    }

    /// Advance time by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        self.current_time_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.current_time_ms.load(Ordering::SeqCst)
    }
}

/// A hasher with the cheapest Argon2 parameters, for tests only.
#[must_use]
pub fn fast_hasher() -> CredentialHasher {
    #[allow(clippy::expect_used)]
    let params = Params::new(
        Params::MIN_M_COST,
        Params::MIN_T_COST,
        Params::MIN_P_COST,
        None,
    )
    .expect("minimum argon2 params are valid");
    CredentialHasher::with_params(params)
}

/// A store whose every call fails as if the backend were unreachable.
pub struct FailingStore;

fn unavailable<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("backend unreachable".to_string()))
}

impl Store for FailingStore {
    fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        unavailable()
    }

    fn find_user(&self, _id: UserId) -> Result<Option<User>, StoreError> {
        unavailable()
    }

    fn create_user(&self, _user: NewUser) -> Result<User, StoreError> {
        unavailable()
    }

    fn find_note(&self, _id: NoteId, _owner: UserId) -> Result<Option<Note>, StoreError> {
        unavailable()
    }

    fn list_notes(&self, _owner: UserId, _filter: &NoteFilter) -> Result<NotePage, StoreError> {
        unavailable()
    }

    fn create_note(&self, _note: NewNote) -> Result<Note, StoreError> {
        unavailable()
    }

    fn update_note(&self, _note: &Note) -> Result<bool, StoreError> {
        unavailable()
    }

    fn delete_note(&self, _id: NoteId, _owner: UserId) -> Result<u64, StoreError> {
        unavailable()
    }
}
