use chrono::Utc;

use crate::crypto::token_fingerprint;
use crate::events::{AuthEvent, EventNotifier};
use crate::{AuthError, Session, SessionStore, TokenIssuer, TokenPair};

/// Rotates a refresh token: the old session is removed and a new one with a
/// new id and token takes its place.
pub struct RefreshTokenAction<S, I> {
    sessions: S,
    issuer: I,
    notifier: EventNotifier,
}

impl<S: SessionStore, I: TokenIssuer> RefreshTokenAction<S, I> {
    pub fn new(sessions: S, issuer: I, notifier: EventNotifier) -> Self {
        Self {
            sessions,
            issuer,
            notifier,
        }
    }

    /// # Returns
    ///
    /// - `Ok(TokenPair)` - the replacement tokens
    /// - `Err(AuthError::SessionNotFound)` - unknown, expired or already rotated token
    /// - `Err(AuthError::InvalidToken)` - bad signature or not a refresh token
    /// - `Err(AuthError::TokenSessionMismatch)` - token subject differs from the session owner
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "refresh_token", skip_all, err)
    )]
    pub async fn execute(
        &self,
        refresh_token: &str,
        ip: &str,
        device: &str,
    ) -> Result<TokenPair, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::InvalidInput("refresh token is required".to_owned()));
        }

        let fingerprint = token_fingerprint(refresh_token);
        let session = self.sessions.get_by_refresh_token(refresh_token).await?;

        let Some(verified) = self.issuer.verify_refresh_token(refresh_token) else {
            log::warn!(
                target: "vira_id",
                "msg=\"refresh rejected\" reason=\"invalid token\" token={fingerprint}"
            );
            return Err(AuthError::InvalidToken);
        };

        if verified.user_id != session.user_id {
            log::warn!(
                target: "vira_id",
                "msg=\"refresh rejected\" reason=\"subject mismatch\" token={fingerprint} session_id={}",
                session.id
            );
            return Err(AuthError::TokenSessionMismatch);
        }

        let tokens = self.issuer.issue_token_pair(&session.user_id)?;

        if !self
            .sessions
            .remove_if_current(refresh_token, &session.key())
            .await?
        {
            log::warn!(
                target: "vira_id",
                "msg=\"refresh rejected\" reason=\"already rotated\" token={fingerprint}"
            );
            return Err(AuthError::SessionNotFound);
        }

        let rotated = Session::new(session.user_id, tokens.refresh_token.clone(), ip, device);
        self.sessions
            .put(&rotated, self.issuer.refresh_token_expiry())
            .await?;

        self.notifier.notify(AuthEvent::TokenRefreshed {
            user_id: session.user_id,
            ip: session.ip,
            device: session.device,
            at: Utc::now(),
        });

        log::info!(
            target: "vira_id",
            "msg=\"token refreshed\" user_id={} old_session_id={} session_id={}",
            session.user_id,
            session.id,
            rotated.id
        );

        Ok(tokens)
    }
}
