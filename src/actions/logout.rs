use crate::crypto::token_fingerprint;
use crate::{AuthError, SessionKey, SessionStore};

/// Ends the session bound to a refresh token.
pub struct LogoutAction<S> {
    sessions: S,
}

impl<S: SessionStore> LogoutAction<S> {
    pub fn new(sessions: S) -> Self {
        LogoutAction { sessions }
    }

    /// Unknown or expired tokens succeed without doing anything. A session
    /// record that cannot be decoded is removed along with its index entry.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - session gone
    /// - `Err(AuthError::InvalidInput)` - empty token
    /// - `Err(_)` - store errors
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "logout", skip_all, err)
    )]
    pub async fn execute(&self, refresh_token: &str) -> Result<(), AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::InvalidInput("refresh token is required".to_owned()));
        }

        let session = match self.sessions.get_by_refresh_token(refresh_token).await {
            Ok(session) => session,
            Err(AuthError::SessionNotFound) => {
                log::debug!(
                    target: "vira_id",
                    "msg=\"logout of unknown session\" token={}",
                    token_fingerprint(refresh_token)
                );
                return Ok(());
            }
            Err(AuthError::CorruptSession(raw_key)) => {
                return self.remove_unreadable(refresh_token, &raw_key).await;
            }
            Err(e) => return Err(e),
        };

        self.sessions.delete(&session.key()).await?;
        self.sessions.delete_index(refresh_token).await?;

        log::info!(
            target: "vira_id",
            "msg=\"logout success\" user_id={} session_id={}",
            session.user_id,
            session.id
        );

        Ok(())
    }

    async fn remove_unreadable(&self, refresh_token: &str, raw_key: &str) -> Result<(), AuthError> {
        let fingerprint = token_fingerprint(refresh_token);

        match SessionKey::parse(raw_key) {
            Some(key) => {
                self.sessions.remove_if_current(refresh_token, &key).await?;
            }
            None => self.sessions.delete_index(refresh_token).await?,
        }

        log::warn!(
            target: "vira_id",
            "msg=\"logout removed unreadable session\" token={fingerprint} key={raw_key}"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::Session;
    use crate::session::{CacheSessionStore, InMemoryCache, KeyValueCache, index_key};

    #[tokio::test]
    async fn test_logout_removes_session_and_index() {
        let store = CacheSessionStore::new(InMemoryCache::new());
        let session = Session::new(Uuid::new_v4(), "refresh-1", "ip", "dev");
        store.put(&session, Duration::days(7)).await.unwrap();

        let logout = LogoutAction::new(store.clone());
        logout.execute("refresh-1").await.unwrap();

        assert!(store.cache().is_empty());
        assert_eq!(
            store.get_by_refresh_token("refresh-1").await.unwrap_err(),
            AuthError::SessionNotFound
        );
    }

    #[tokio::test]
    async fn test_logout_unknown_token_is_ok() {
        let store = CacheSessionStore::new(InMemoryCache::new());
        let logout = LogoutAction::new(store);

        assert!(logout.execute("never-issued").await.is_ok());
        assert!(logout.execute("never-issued").await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_leaves_other_sessions() {
        let store = CacheSessionStore::new(InMemoryCache::new());
        let user_id = Uuid::new_v4();
        let first = Session::new(user_id, "t1", "ip", "dev");
        let second = Session::new(user_id, "t2", "ip", "dev");
        store.put(&first, Duration::days(7)).await.unwrap();
        store.put(&second, Duration::days(7)).await.unwrap();

        LogoutAction::new(store.clone()).execute("t1").await.unwrap();

        let remaining = store.list_all_by_user(&user_id, 10).await.unwrap();
        assert_eq!(remaining, vec![second]);
    }

    #[tokio::test]
    async fn test_empty_token() {
        let logout = LogoutAction::new(CacheSessionStore::new(InMemoryCache::new()));
        assert!(matches!(
            logout.execute("").await,
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_unreadable_session() {
        let store = CacheSessionStore::new(InMemoryCache::new());
        let key = SessionKey::new(&Uuid::new_v4(), &Uuid::new_v4());
        store
            .cache()
            .set_many(
                &[
                    (key.as_str().to_owned(), "{not json".to_owned()),
                    (index_key("broken"), key.as_str().to_owned()),
                ],
                Duration::days(7),
            )
            .await
            .unwrap();

        LogoutAction::new(store.clone())
            .execute("broken")
            .await
            .unwrap();

        assert!(store.cache().is_empty());
        assert_eq!(
            store.get_by_refresh_token("broken").await.unwrap_err(),
            AuthError::SessionNotFound
        );
    }
}
