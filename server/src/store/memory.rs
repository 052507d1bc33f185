//! In-memory store.
//!
//! Keeps users and notes in maps behind a single `RwLock`. IDs are assigned
//! sequentially starting at 1, like an auto-increment primary key.
//!
//! # Thread Safety
//!
//! Reads take the shared lock; writes take the exclusive lock. The lock is
//! never held across an await point because every method is synchronous.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    NewNote, NewUser, Note, NoteFilter, NoteId, NotePage, Store, StoreError, User, UserId,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    /// Normalized email to user ID; enforces email uniqueness.
    emails: HashMap<String, UserId>,
    notes: BTreeMap<NoteId, Note>,
    last_user_id: u64,
    last_note_id: u64,
}

/// A [`Store`] that lives in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }
}

fn next_id(counter: &mut u64) -> Result<u64, StoreError> {
    *counter = counter
        .checked_add(1)
        .ok_or_else(|| StoreError::Unavailable("id space exhausted".to_string()))?;
    Ok(*counter)
}

fn matches_search(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}

impl Store for MemoryStore {
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    // The write lock covers the uniqueness check and the insert.
    #[allow(clippy::significant_drop_tightening)]
    fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables.emails.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let id = UserId::new(next_id(&mut tables.last_user_id)?)
            .ok_or_else(|| StoreError::Unavailable("invalid user id".to_string()))?;
        let created = User {
            id,
            name: user.name,
            email: user.email,
            password_digest: user.password_digest,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        tables.emails.insert(created.email.clone(), id);
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    fn find_note(&self, id: NoteId, owner: UserId) -> Result<Option<Note>, StoreError> {
        Ok(self
            .read()?
            .notes
            .get(&id)
            .filter(|note| note.owner == owner)
            .cloned())
    }

    fn list_notes(&self, owner: UserId, filter: &NoteFilter) -> Result<NotePage, StoreError> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let tables = self.read()?;

        let mut matching: Vec<&Note> = tables
            .notes
            .values()
            .filter(|note| note.owner == owner)
            .filter(|note| needle.as_deref().is_none_or(|n| matches_search(note, n)))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let notes = matching
            .into_iter()
            .skip(filter.offset())
            .take(filter.limit as usize)
            .cloned()
            .collect();

        Ok(NotePage {
            notes,
            total,
            page: filter.page,
            limit: filter.limit,
        })
    }

    fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let mut tables = self.write()?;
        let id = NoteId::new(next_id(&mut tables.last_note_id)?)
            .ok_or_else(|| StoreError::Unavailable("invalid note id".to_string()))?;
        let created = Note {
            id,
            title: note.title,
            content: note.content,
            owner: note.owner,
            created_at: note.created_at,
            updated_at: note.created_at,
        };
        tables.notes.insert(id, created.clone());
        Ok(created)
    }

    fn update_note(&self, note: &Note) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        match tables.notes.get_mut(&note.id) {
            Some(stored) if stored.owner == note.owner => {
                stored.title.clone_from(&note.title);
                stored.content.clone_from(&note.content);
                stored.updated_at = note.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete_note(&self, id: NoteId, owner: UserId) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let owned = tables.notes.get(&id).is_some_and(|note| note.owner == owner);
        if owned {
            tables.notes.remove(&id);
            Ok(1)
        } else {
            Ok(0)
        }
    }
}
