use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{AuthError, SecretString};

/// Access and refresh token issued together.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// What a successfully verified refresh token says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies tokens for an account id.
///
/// Issuance errors surface as `AuthError::IssuanceError`. Verification fails
/// closed: anything that is not a well-formed, unexpired refresh token signed
/// by this issuer yields `None`.
pub trait TokenIssuer: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::IssuanceError` when signing fails.
    fn issue_access_token(&self, user_id: &Uuid) -> Result<String, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::IssuanceError` when signing fails.
    fn issue_refresh_token(&self, user_id: &Uuid) -> Result<String, AuthError>;

    fn verify_refresh_token(&self, token: &str) -> Option<VerifiedToken>;

    fn access_token_expiry(&self) -> Duration;

    /// Lifetime of refresh tokens, also used as the session TTL.
    fn refresh_token_expiry(&self) -> Duration;

    /// # Errors
    ///
    /// Returns `AuthError::IssuanceError` when either token cannot be signed.
    fn issue_token_pair(&self, user_id: &Uuid) -> Result<TokenPair, AuthError> {
        let access_token = self.issue_access_token(user_id)?;
        let refresh_token = self.issue_refresh_token(user_id)?;

        Ok(TokenPair {
            access_token: SecretString::new(access_token),
            refresh_token: SecretString::new(refresh_token),
            expires_in: self.access_token_expiry().num_seconds(),
        })
    }
}
