//! JWT issuance and verification.
//!
//! Issues and validates HS256 JSON Web Tokens that carry the subject's user
//! ID and email address.
//!
//! # Pre-conditions
//! - The signing secret must be non-empty.
//!
//! # Post-conditions
//! - `issue` returns a token whose `exp` is `iat + lifetime`.
//! - `validate` returns the subject only for a token signed with this
//!   service's secret whose `exp` lies strictly in the future.
//!
//! # Invariants
//! - The signature is checked before the expiry; a tampered token is always
//!   reported as `BadSignature` even when it has also expired.
//! - Validation is pure: no I/O, no shared mutable state.
//! - Tokens cannot be revoked. Rotating the secret invalidates every
//!   outstanding token.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::store::UserId;
use crate::time::TimeSource;

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(72 * 60 * 60);

/// Claims embedded in every token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user ID as a decimal string.
    sub: String,
    /// Email address of the subject at issuance.
    email: String,
    /// Issued-at, seconds since Unix epoch.
    iat: u64,
    /// Expiry, seconds since Unix epoch.
    exp: u64,
    /// Random nonce; makes every issued token unique.
    jti: String,
}

/// The subject recovered from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    /// User ID from the `sub` claim.
    pub subject_id: UserId,
    /// Email from the `email` claim.
    pub email: String,
}

/// Error returned when JWT verification fails.
///
/// Callers facing clients must not reveal which variant occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The token is malformed, cannot be parsed, or carries bad claims.
    Malformed,
    /// The token signature does not match.
    BadSignature,
    /// The token has expired.
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed JWT"),
            Self::BadSignature => write!(f, "invalid JWT signature"),
            Self::Expired => write!(f, "JWT has expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Error returned when the token service cannot be built or cannot sign.
#[derive(Debug)]
pub enum TokenIssueError {
    /// The signing secret is empty.
    EmptySecret,
    /// The token lifetime is zero or does not fit in the timestamp range.
    InvalidLifetime,
    /// Encoding or signing the token failed.
    Signing(String),
}

impl std::fmt::Display for TokenIssueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "JWT secret must not be empty"),
            Self::InvalidLifetime => {
                write!(f, "token lifetime must be a positive number of seconds")
            }
            Self::Signing(reason) => write!(f, "failed to sign JWT: {reason}"),
        }
    }
}

impl std::error::Error for TokenIssueError {}

/// Issues and validates identity tokens with a process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_secs: u64,
    time: Arc<dyn TimeSource>,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// * `secret` - The shared HMAC-SHA256 secret.
    /// * `lifetime` - How long issued tokens stay valid; sub-second parts are ignored.
    /// * `time` - Clock used for `iat`, `exp` and the expiry check.
    ///
    /// # Errors
    /// Returns `TokenIssueError::EmptySecret` for an empty secret and
    /// `TokenIssueError::InvalidLifetime` for a lifetime under one second.
    pub fn new(
        secret: &[u8],
        lifetime: Duration,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, TokenIssueError> {
        if secret.is_empty() {
            return Err(TokenIssueError::EmptySecret);
        }
        let lifetime_secs = lifetime.as_secs();
        if lifetime_secs == 0 {
            return Err(TokenIssueError::InvalidLifetime);
        }

        // Expiry is checked by `validate` against our own time source, after
        // the signature has been verified.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "sub".to_string()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime_secs,
            time,
        })
    }

    /// Lifetime of issued tokens.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_secs)
    }

    /// Issue a signed token for a subject.
    ///
    /// # Errors
    /// Returns `TokenIssueError` if the expiry overflows or signing fails.
    pub fn issue(&self, subject_id: UserId, email: &str) -> Result<String, TokenIssueError> {
        let iat = self.time.now_secs();
        let exp = iat
            .checked_add(self.lifetime_secs)
            .ok_or(TokenIssueError::InvalidLifetime)?;
        let claims = Claims {
            sub: subject_id.to_string(),
            email: email.to_string(),
            iat,
            exp,
            jti: format!("{:032x}", rand::random::<u128>()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenIssueError::Signing(e.to_string()))
    }

    /// Validate a token and recover its subject.
    ///
    /// # Errors
    /// Returns `TokenError::Malformed`, `TokenError::BadSignature` or
    /// `TokenError::Expired`, checked in that order.
    pub fn validate(&self, token: &str) -> Result<TokenSubject, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(map_jwt_error)?;
        let claims = token_data.claims;

        if claims.exp <= self.time.now_secs() {
            return Err(TokenError::Expired);
        }

        let subject_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Malformed)?;

        Ok(TokenSubject {
            subject_id,
            email: claims.email,
        })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

/// Maps jsonwebtoken errors to our `TokenError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
