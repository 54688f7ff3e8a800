use uuid::Uuid;

use crate::{AuthError, SessionKey, SessionStore};

/// Ends one session by id, e.g. from a "signed in devices" screen.
pub struct RevokeSessionAction<S> {
    sessions: S,
}

impl<S: SessionStore> RevokeSessionAction<S> {
    pub fn new(sessions: S) -> Self {
        RevokeSessionAction { sessions }
    }

    /// Deletes the session record and, if its refresh token still points at
    /// it, the index entry. Revoking an absent session succeeds.
    ///
    /// A record that cannot be decoded is deleted anyway; its index entry is
    /// left to expire. A failing cache read aborts before anything is deleted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "revoke_session", skip_all, err)
    )]
    pub async fn execute(&self, user_id: &Uuid, session_id: &Uuid) -> Result<(), AuthError> {
        let key = SessionKey::new(user_id, session_id);

        match self.sessions.get(&key).await {
            Ok(Some(session)) => {
                self.sessions
                    .remove_if_current(session.token.expose_secret(), &key)
                    .await?;
            }
            Ok(None) => {}
            // an unreadable record is still deleted below
            Err(AuthError::CorruptSession(_)) => log::warn!(
                target: "vira_id",
                "msg=\"revoking unreadable session\" key={key}"
            ),
            Err(e) => {
                log::error!(
                    target: "vira_id",
                    "msg=\"revoke failed\" key={key} error=\"{e}\""
                );
                return Err(e);
            }
        }

        self.sessions.delete(&key).await?;

        log::info!(
            target: "vira_id",
            "msg=\"session revoked\" user_id={user_id} session_id={session_id}"
        );

        Ok(())
    }
}
