//! Registration and login.
//!
//! The only callers of [`CredentialHasher`] and [`TokenService::issue`].
//!
//! # Invariants
//! - Emails are trimmed and lower-cased before they are stored or looked up.
//! - An unknown email and a wrong password produce the same error after the
//!   same amount of Argon2 work.
//! - Every method may block (Argon2, store); async callers run it on the
//!   blocking pool.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::{
    CredentialHasher, HashingError, MIN_PASSWORD_LENGTH, TokenIssueError, TokenService,
};
use crate::store::{NewUser, Store, StoreError, User, UserProfile};
use crate::time::TimeSource;

/// A freshly issued token together with the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// Errors from registration and login.
#[derive(Debug)]
pub enum AccountError {
    /// The input is missing a field or violates a policy.
    Validation(&'static str),
    /// The email is already registered.
    EmailTaken,
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// The password could not be hashed.
    Hashing(HashingError),
    /// The token could not be signed.
    Token(TokenIssueError),
    /// The store failed.
    Store(StoreError),
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::EmailTaken => write!(f, "email already registered"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Hashing(e) => write!(f, "hashing error: {e}"),
            Self::Token(e) => write!(f, "token error: {e}"),
            Self::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for AccountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hashing(e) => Some(e),
            Self::Token(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Validation(_) | Self::EmailTaken | Self::InvalidCredentials => None,
        }
    }
}

impl From<HashingError> for AccountError {
    fn from(e: HashingError) -> Self {
        Self::Hashing(e)
    }
}

impl From<TokenIssueError> for AccountError {
    fn from(e: TokenIssueError) -> Self {
        Self::Token(e)
    }
}

impl From<StoreError> for AccountError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => Self::EmailTaken,
            other => Self::Store(other),
        }
    }
}

/// Canonical form of an email address used as the login identifier.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers users and logs them in.
pub struct AccountService {
    store: Arc<dyn Store>,
    hasher: CredentialHasher,
    tokens: Arc<TokenService>,
    time: Arc<dyn TimeSource>,
}

impl AccountService {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        hasher: CredentialHasher,
        tokens: Arc<TokenService>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            time,
        }
    }

    /// Create an account and issue its first token.
    ///
    /// # Errors
    /// - `Validation` if the name or email is blank or the password is too short.
    /// - `EmailTaken` if the normalized email is already registered.
    /// - `Hashing`, `Token` or `Store` on dependency failure.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AccountError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountError::Validation("Name is required"));
        }
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AccountError::Validation("Email is required"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::Validation(
                "Password must be at least 6 characters long",
            ));
        }

        if self.store.find_user_by_email(&email)?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_digest = self.hasher.hash(password)?;
        let user = self.store.create_user(NewUser {
            name: name.to_string(),
            email,
            password_digest,
            created_at: self.time.now_utc(),
        })?;
        tracing::info!("registered user {}", user.id);

        self.session_for(&user)
    }

    /// Check credentials and issue a new token.
    ///
    /// # Errors
    /// - `Validation` if the email or password is blank.
    /// - `InvalidCredentials` for an unknown email or a wrong password.
    /// - `Token` or `Store` on dependency failure.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession, AccountError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AccountError::Validation("Email is required"));
        }
        if password.trim().is_empty() {
            return Err(AccountError::Validation("Password is required"));
        }

        let Some(user) = self.store.find_user_by_email(&email)? else {
            self.hasher.verify_decoy(password);
            tracing::debug!("login failed: unknown email");
            return Err(AccountError::InvalidCredentials);
        };
        if !self.hasher.verify(password, &user.password_digest) {
            tracing::debug!("login failed: wrong password for user {}", user.id);
            return Err(AccountError::InvalidCredentials);
        }

        self.session_for(&user)
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, AccountError> {
        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(AuthSession {
            token,
            user: user.profile(),
        })
    }
}
