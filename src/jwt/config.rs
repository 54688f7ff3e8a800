use chrono::Duration;
use std::fmt;

use crate::AuthError;
use crate::config::TokenConfig;

/// Minimum required length for the signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Signing key, lifetimes and optional `iss`/`aud` claims for [`JwtService`](super::JwtService).
#[derive(Clone)]
pub struct JwtConfig {
    pub(crate) secret: String,
    pub(crate) access_expiry: Duration,
    pub(crate) refresh_expiry: Duration,
    pub(crate) issuer: Option<String>,
    pub(crate) audience: Option<String>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("access_expiry", &self.access_expiry)
            .field("refresh_expiry", &self.refresh_expiry)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtConfig {
    /// Creates a configuration with 15 minute access and 7 day refresh lifetimes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfigurationError` if the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthError> {
        Self::from_token_config(secret, &TokenConfig::default())
    }

    /// Takes both lifetimes from `tokens`, so the refresh token and the
    /// session TTL always agree.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfigurationError` if the secret is too short or a
    /// lifetime is not positive.
    pub fn from_token_config(
        secret: impl Into<String>,
        tokens: &TokenConfig,
    ) -> Result<Self, AuthError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::ConfigurationError(format!(
                "JWT secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        if tokens.access_token_expiry <= Duration::zero()
            || tokens.refresh_token_expiry <= Duration::zero()
        {
            return Err(AuthError::ConfigurationError(
                "token lifetimes must be positive".to_owned(),
            ));
        }

        Ok(Self {
            secret,
            access_expiry: tokens.access_token_expiry,
            refresh_expiry: tokens.refresh_token_expiry,
            issuer: None,
            audience: None,
        })
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn access_expiry(&self) -> Duration {
        self.access_expiry
    }

    pub fn refresh_expiry(&self) -> Duration {
        self.refresh_expiry
    }
}
