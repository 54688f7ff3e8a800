//! Session and token lifecycle core of the vira identity service.
//!
//! The crate issues access/refresh token pairs, keeps one session record per
//! authenticated client in a shared key/value cache (plus a reverse index from
//! refresh token to session), rotates sessions on refresh, lists a user's
//! sessions with a cursor scan and revokes them.
//!
//! # Layout
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`validators`] | Username, password and email rules |
//! | [`jwt`] | HS256 token issuer implementing [`TokenIssuer`] |
//! | [`session`] | [`KeyValueCache`] contract and the cache-backed [`SessionStore`] |
//! | [`repository`] | [`AccountRepository`] contract for the external user store |
//! | [`events`] | Fire-and-forget lifecycle events on a bounded worker pool |
//! | [`actions`] | One struct per lifecycle operation |
//! | [`SessionManager`] | Facade wiring everything together |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vira_id::config::IdentityConfig;
//! use vira_id::events::{EventNotifier, InMemoryMetrics, LoggingPublisher};
//! use vira_id::jwt::{JwtConfig, JwtService};
//! use vira_id::session::{CacheSessionStore, InMemoryCache};
//! use vira_id::{Credentials, SessionManager};
//!
//! let config = IdentityConfig::default();
//! let issuer = JwtService::new(JwtConfig::from_token_config(secret, &config.tokens)?);
//! let store = CacheSessionStore::new(InMemoryCache::new());
//! let (notifier, workers) = EventNotifier::start(
//!     LoggingPublisher::new(),
//!     Arc::new(InMemoryMetrics::new()),
//!     config.notifier.clone(),
//! );
//!
//! let manager = SessionManager::new(accounts, store, issuer, notifier, config);
//! let response = manager
//!     .register(&Credentials::new("alice", "Str0ng!Pass"), "10.0.0.1", "curl/8.0")
//!     .await?;
//! ```

pub mod actions;
pub mod config;
pub mod crypto;
pub mod events;
pub mod jwt;
mod manager;
pub mod repository;
mod secret;
pub mod session;
pub mod validators;

pub use actions::{AuthResponse, Credentials, UserInfo};
pub use jwt::{TokenIssuer, TokenPair, VerifiedToken};
pub use manager::SessionManager;
pub use repository::{Account, AccountRepository, NewAccount};
pub use secret::SecretString;
pub use session::{KeyValueCache, Session, SessionKey, SessionPage, SessionStore};
pub use validators::ValidationError;

#[cfg(any(test, feature = "mocks"))]
pub use events::MockEventPublisher;
#[cfg(any(test, feature = "mocks"))]
pub use repository::MockAccountRepository;

use std::fmt;

/// Broad class of an [`AuthError`], used for status mapping and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input. Never retried.
    Validation,
    /// Bad credentials or bad token.
    Authentication,
    /// Session or account absent.
    NotFound,
    /// Duplicate account.
    Conflict,
    /// Cache or database failure.
    Store,
    /// Misconfiguration or a failing primitive (signing, hashing).
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    Validation(ValidationError),
    InvalidInput(String),
    InvalidCredentials,
    InvalidToken,
    TokenSessionMismatch,
    AccountNotConfirmed,
    AccountNotFound,
    SessionNotFound,
    DuplicateAccount,
    StoreError(String),
    /// A session record exists under this key but cannot be decoded.
    CorruptSession(String),
    IssuanceError(String),
    PasswordHashError,
    ConfigurationError(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::TokenSessionMismatch
            | Self::AccountNotConfirmed => ErrorKind::Authentication,
            Self::AccountNotFound | Self::SessionNotFound => ErrorKind::NotFound,
            Self::DuplicateAccount => ErrorKind::Conflict,
            Self::StoreError(_) | Self::CorruptSession(_) => ErrorKind::Store,
            Self::IssuanceError(_) | Self::PasswordHashError | Self::ConfigurationError(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status a transport layer should answer with.
    ///
    /// Account and session lookups answer 401 rather than 404 so that a caller
    /// cannot probe which usernames or tokens exist.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Conflict => 400,
            ErrorKind::Authentication | ErrorKind::NotFound => 401,
            ErrorKind::Store | ErrorKind::Internal => 500,
        }
    }
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::InvalidCredentials => write!(f, "Invalid username or password"),
            Self::InvalidToken => write!(f, "Invalid refresh token"),
            Self::TokenSessionMismatch => write!(f, "Refresh token does not match its session"),
            Self::AccountNotConfirmed => write!(f, "Account is not confirmed"),
            Self::AccountNotFound => write!(f, "Account not found"),
            Self::SessionNotFound => write!(f, "Session not found"),
            Self::DuplicateAccount => write!(f, "Username or email already taken"),
            Self::StoreError(msg) => write!(f, "Store error: {msg}"),
            Self::CorruptSession(key) => write!(f, "Corrupt session record: {key}"),
            Self::IssuanceError(msg) => write!(f, "Token issuance failed: {msg}"),
            Self::PasswordHashError => write!(f, "Failed to hash password"),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Validation(ValidationError::WeakPassword).status_code(),
            400
        );
        assert_eq!(AuthError::DuplicateAccount.status_code(), 400);
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::SessionNotFound.status_code(), 401);
        assert_eq!(AuthError::TokenSessionMismatch.status_code(), 401);
        assert_eq!(AuthError::StoreError("down".to_owned()).status_code(), 500);
        assert_eq!(AuthError::CorruptSession("k".to_owned()).status_code(), 500);
        assert_eq!(AuthError::PasswordHashError.status_code(), 500);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::InvalidToken.kind(), ErrorKind::Authentication);
        assert_eq!(AuthError::AccountNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::DuplicateAccount.kind(), ErrorKind::Conflict);
        assert_eq!(
            AuthError::IssuanceError("bad key".to_owned()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_validation_error_converts() {
        let err: AuthError = ValidationError::InvalidEmail.into();
        assert_eq!(err, AuthError::Validation(ValidationError::InvalidEmail));
        assert_eq!(err.to_string(), ValidationError::InvalidEmail.to_string());
    }
}
