//! Demo data for local development.
//!
//! Goes through [`AccountService`] and [`NoteService`] like any client would,
//! so seeded accounts carry real Argon2 digests and normalized emails, and
//! notes are written under the identity recovered from the issued token.

use crate::accounts::{AccountError, AccountService};
use crate::auth::{Identity, TokenError, TokenService};
use crate::notes::{NoteError, NoteService};

/// Password shared by every demo account.
pub const DEMO_PASSWORD: &str = "password123";

const DEMO_USERS: [(&str, &str); 3] = [
    ("John Doe", "john@example.com"),
    ("Jane Smith", "jane@example.com"),
    ("Bob Johnson", "bob@example.com"),
];

const DEMO_NOTES: [(&str, &str); 3] = [
    (
        "Welcome Note",
        "This is your first note! You can create, edit, and delete notes.",
    ),
    (
        "Meeting Notes",
        "Project discussion:\n- Implement authentication\n- Add note management\n\
         - Deploy to production",
    ),
    ("Shopping List", "Groceries:\n- Milk\n- Bread\n- Eggs\n- Fruits"),
];

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users_created: usize,
    pub users_skipped: usize,
    pub notes_created: usize,
}

/// Errors that abort seeding.
#[derive(Debug)]
pub enum SeedError {
    Account(AccountError),
    Token(TokenError),
    Note(NoteError),
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(e) => write!(f, "failed to create demo user: {e}"),
            Self::Token(e) => write!(f, "demo user token rejected: {e}"),
            Self::Note(e) => write!(f, "failed to create demo note: {e}"),
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Account(e) => Some(e),
            Self::Token(e) => Some(e),
            Self::Note(e) => Some(e),
        }
    }
}

/// Create the demo users, each with the sample notes.
///
/// A user whose email is already registered is skipped along with its notes.
/// Blocks on Argon2 and the store.
///
/// `tokens` must be the service `accounts` issues with.
///
/// # Errors
/// Returns the first account, token or note failure other than a taken email.
pub fn seed_demo_data(
    accounts: &AccountService,
    tokens: &TokenService,
    notes: &NoteService,
) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    for (name, email) in DEMO_USERS {
        let session = match accounts.register(name, email, DEMO_PASSWORD) {
            Ok(session) => session,
            Err(AccountError::EmailTaken) => {
                tracing::warn!("demo user {email} already exists, skipping");
                summary.users_skipped += 1;
                continue;
            }
            Err(e) => return Err(SeedError::Account(e)),
        };
        summary.users_created += 1;

        let subject = tokens
            .validate(&session.token)
            .map_err(SeedError::Token)?;
        let identity = Identity::new(subject.subject_id, subject.email);
        for (title, content) in DEMO_NOTES {
            notes
                .create(&identity, title, content)
                .map_err(SeedError::Note)?;
            summary.notes_created += 1;
        }
        tracing::info!("created demo user {email}");
    }

    Ok(summary)
}
