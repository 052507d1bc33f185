//! Server configuration module.
//!
//! This module provides configuration loading for the notes server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `NOTES_JWT_SECRET`: Secret used to sign and verify tokens (required)
//! - `NOTES_TOKEN_TTL_HOURS`: Lifetime of issued tokens in hours (default: `72`)
//! - `NOTES_LISTEN_PORT`: Port to listen on (default: `3000`)
//! - `NOTES_SEED_DEMO_DATA`: Create demo users and notes at startup (default: `false`)
//!
//! # Invariants
//!
//! - `jwt_secret` is never empty and never printed
//! - `token_lifetime` is at least one hour
//! - `listen_port` is always a valid port number (1-65535)

use std::time::Duration;

/// Server configuration.
///
/// Loaded once at process start and never modified afterwards.
///
/// # Pre-conditions
///
/// When constructed via `from_env()`:
/// - All required environment variables must be set
/// - All values must be valid for their respective types
#[derive(Clone)]
pub struct ServerConfig {
    /// Secret used to sign tokens.
    /// Changing it invalidates every token issued with the old value.
    pub jwt_secret: Vec<u8>,
    /// How long an issued token stays valid.
    pub token_lifetime: Duration,
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
    /// Whether to create demo users and notes at startup.
    pub seed_demo_data: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("listen_port", &self.listen_port)
            .field("seed_demo_data", &self.seed_demo_data)
            .finish()
    }
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const JWT_SECRET_VAR: &str = "NOTES_JWT_SECRET";
const TOKEN_TTL_VAR: &str = "NOTES_TOKEN_TTL_HOURS";
const LISTEN_PORT_VAR: &str = "NOTES_LISTEN_PORT";
const SEED_DEMO_DATA_VAR: &str = "NOTES_SEED_DEMO_DATA";

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default token lifetime in hours.
    pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 72;

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `NOTES_JWT_SECRET` is not set or is empty
    /// - any optional variable is set to an invalid value
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` passes the process environment; tests pass a map.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = Self::load_jwt_secret(lookup(JWT_SECRET_VAR))?;
        let token_lifetime = Self::load_token_lifetime(lookup(TOKEN_TTL_VAR))?;
        let listen_port = Self::load_listen_port(lookup(LISTEN_PORT_VAR))?;
        let seed_demo_data = Self::load_seed_demo_data(lookup(SEED_DEMO_DATA_VAR))?;

        Ok(Self {
            jwt_secret,
            token_lifetime,
            listen_port,
            seed_demo_data,
        })
    }

    /// Load the signing secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or is empty.
    fn load_jwt_secret(value: Option<String>) -> Result<Vec<u8>, ConfigError> {
        let secret = value.ok_or_else(|| ConfigError::MissingEnvVar(JWT_SECRET_VAR.to_string()))?;

        if secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: JWT_SECRET_VAR.to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(secret.into_bytes())
    }

    /// Load the token lifetime.
    ///
    /// Returns the default if not set.
    fn load_token_lifetime(value: Option<String>) -> Result<Duration, ConfigError> {
        let Some(value) = value else {
            return Ok(Duration::from_secs(Self::DEFAULT_TOKEN_TTL_HOURS * 3600));
        };

        value
            .parse::<u64>()
            .ok()
            .filter(|hours| *hours > 0)
            .and_then(|hours| hours.checked_mul(3600))
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::InvalidValue {
                name: TOKEN_TTL_VAR.to_string(),
                message: format!("'{value}' is not a positive number of hours"),
            })
    }

    /// Load the listen port.
    ///
    /// Returns the default if not set.
    fn load_listen_port(value: Option<String>) -> Result<u16, ConfigError> {
        match value {
            Some(value) => value
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: LISTEN_PORT_VAR.to_string(),
                    message: format!("'{value}' is not a valid port number (must be 1-65535)"),
                }),
            None => Ok(Self::DEFAULT_PORT),
        }
    }

    /// Load the demo data flag.
    ///
    /// Returns `false` if not set.
    fn load_seed_demo_data(value: Option<String>) -> Result<bool, ConfigError> {
        match value.as_deref().map(str::trim) {
            None | Some("" | "0" | "false") => Ok(false),
            Some("1" | "true") => Ok(true),
            Some(other) => Err(ConfigError::InvalidValue {
                name: SEED_DEMO_DATA_VAR.to_string(),
                message: format!("'{other}' is not a boolean (use true/false or 1/0)"),
            }),
        }
    }
}
