use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::{JwtClaims, JwtConfig, TokenIssuer, TokenType, VerifiedToken};
use crate::AuthError;
use crate::crypto::generate_token;

/// Length of the JWT ID (jti) in characters.
const JTI_LENGTH: usize = 16;

/// HS256 [`TokenIssuer`].
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn encode(
        &self,
        user_id: &Uuid,
        token_type: TokenType,
        lifetime: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = JwtClaims {
            sub: user_id.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            jti: generate_token(JTI_LENGTH),
            token_type,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::IssuanceError(e.to_string()))
    }

    /// Decodes and validates a token of either type.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for bad signatures, expired tokens and
    /// malformed input.
    pub fn decode(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        // configured claims must be present, not just match when present
        let mut required = vec!["exp"];

        if let Some(ref iss) = self.config.issuer {
            validation.set_issuer(&[iss]);
            required.push("iss");
        }

        if let Some(ref aud) = self.config.audience {
            validation.set_audience(&[aud]);
            required.push("aud");
        }

        validation.set_required_spec_claims(&required);

        jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

impl TokenIssuer for JwtService {
    fn issue_access_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        self.encode(user_id, TokenType::Access, self.config.access_expiry())
    }

    fn issue_refresh_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        self.encode(user_id, TokenType::Refresh, self.config.refresh_expiry())
    }

    fn verify_refresh_token(&self, token: &str) -> Option<VerifiedToken> {
        let claims = self.decode(token).ok()?;

        if !claims.is_refresh_token() {
            return None;
        }

        Some(VerifiedToken {
            user_id: claims.user_id()?,
            expires_at: DateTime::from_timestamp(claims.exp, 0)?,
        })
    }

    fn access_token_expiry(&self) -> Duration {
        self.config.access_expiry()
    }

    fn refresh_token_expiry(&self) -> Duration {
        self.config.refresh_expiry()
    }
}
