//! Authentication module.
//!
//! This module provides password hashing, token issuance and validation, and
//! the per-request authorization gate for the notes server.
//!
//! # Pre-conditions
//! - The token service must be built from a non-empty signing secret.
//!
//! # Post-conditions
//! - The signing secret is immutable once loaded.
//!
//! # Invariants
//! - Passwords, digests and tokens are never logged.

pub mod gate;
pub mod jwt;
pub mod password;

pub use gate::{AuthorizationGate, Identity, Rejection};
pub use jwt::{DEFAULT_TOKEN_LIFETIME, TokenError, TokenIssueError, TokenService, TokenSubject};
pub use password::{CredentialHasher, HashingError, MIN_PASSWORD_LENGTH};
