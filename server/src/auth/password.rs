//! Password hashing.
//!
//! Plaintext passwords are turned into Argon2id PHC strings before they reach
//! the store, and checked against those strings at login.
//!
//! # Pre-conditions
//! - Callers enforce [`MIN_PASSWORD_LENGTH`] before hashing.
//!
//! # Post-conditions
//! - Every digest carries its own random salt and cost parameters, so
//!   verification keeps working if the default parameters change.
//!
//! # Invariants
//! - Plaintext passwords and digests are never logged.
//! - A login for an unknown account costs one Argon2 verification, the same
//!   as a wrong password (see [`CredentialHasher::verify_decoy`]).

use std::sync::OnceLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::TryRngCore;
use rand::rngs::OsRng;

/// Minimum number of characters accepted for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Number of random salt bytes drawn per digest.
const SALT_LENGTH: usize = 16;

/// Plaintext behind the decoy digest. Its verification result is discarded.
const DECOY_PASSWORD: &str = "decoy-password-never-accepted";

/// Error returned when a password cannot be hashed.
///
/// Only raised on entropy or resource failure; a wrong password is never an
/// error.
#[derive(Debug)]
pub enum HashingError {
    /// The operating system random number generator failed.
    Entropy(String),
    /// The Argon2 primitive rejected its input or parameters.
    Algorithm(String),
}

impl std::fmt::Display for HashingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entropy(reason) => write!(f, "failed to gather salt entropy: {reason}"),
            Self::Algorithm(reason) => write!(f, "password hashing failed: {reason}"),
        }
    }
}

impl std::error::Error for HashingError {}

/// One-way transform of plaintext passwords into storable digests.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Digest of [`DECOY_PASSWORD`] under this hasher's parameters, built on first use.
    decoy: OnceLock<String>,
}

impl CredentialHasher {
    /// Create a hasher using the argon2 crate's recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
            decoy: OnceLock::new(),
        }
    }

    /// Create an Argon2id hasher with explicit cost parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: OnceLock::new(),
        }
    }

    /// Hash a plaintext password with a fresh salt.
    ///
    /// # Errors
    /// Returns `HashingError` if the salt cannot be generated or Argon2 fails.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let mut salt_bytes = [0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| HashingError::Entropy(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| HashingError::Algorithm(e.to_string()))?;

        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashingError::Algorithm(e.to_string()))?;
        Ok(digest.to_string())
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// Returns `false` on mismatch and on a digest that does not parse.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        PasswordHash::new(digest).is_ok_and(|parsed| {
            self.argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Spend one verification's worth of work when there is no digest to
    /// check against, so a missing account takes as long as a wrong password.
    ///
    /// The outcome is discarded; the caller rejects the login regardless.
    pub fn verify_decoy(&self, plaintext: &str) {
        let digest = if let Some(digest) = self.decoy.get() {
            digest
        } else {
            match self.hash(DECOY_PASSWORD) {
                Ok(digest) => self.decoy.get_or_init(|| digest),
                Err(e) => {
                    tracing::warn!("failed to build decoy digest: {e}");
                    return;
                }
            }
        };
        let _ = self.verify(plaintext, digest);
    }

    #[cfg(test)]
    pub(crate) fn decoy_built(&self) -> bool {
        self.decoy.get().is_some()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}
