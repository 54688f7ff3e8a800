use uuid::Uuid;

use super::{SessionInfo, SessionsResponse};
use crate::config::IdentityConfig;
use crate::{AuthError, SessionStore};

#[derive(Debug, Clone)]
pub struct ListSessionsConfig {
    /// Default: 20
    pub page_size: usize,
}

impl Default for ListSessionsConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl ListSessionsConfig {
    pub fn from_identity_config(config: &IdentityConfig) -> Self {
        Self {
            page_size: config.sessions.list_page_size,
        }
    }
}

/// Lists a user's sessions one page at a time.
///
/// The listing is weakly consistent: sessions opened or closed while a client
/// pages through may be missed or repeated.
pub struct ListSessionsAction<S> {
    sessions: S,
    config: ListSessionsConfig,
}

impl<S: SessionStore> ListSessionsAction<S> {
    pub fn new(sessions: S) -> Self {
        Self::with_config(sessions, ListSessionsConfig::default())
    }

    pub fn with_config(sessions: S, config: ListSessionsConfig) -> Self {
        Self { sessions, config }
    }

    /// Pass `cursor = 0` for the first page and the returned cursor after
    /// that, until it comes back as `0`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "list_sessions", skip_all, err)
    )]
    pub async fn execute(&self, user_id: &Uuid, cursor: u64) -> Result<SessionsResponse, AuthError> {
        let page = self
            .sessions
            .list_by_user(user_id, cursor, self.config.page_size)
            .await?;

        Ok(SessionsResponse {
            cursor: page.next_cursor,
            sessions: page.sessions.into_iter().map(SessionInfo::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Duration;

    use super::*;
    use crate::Session;
    use crate::session::{CacheSessionStore, InMemoryCache};

    #[tokio::test]
    async fn test_paging_yields_every_session_once() {
        let store = CacheSessionStore::new(InMemoryCache::new());
        let user_id = Uuid::new_v4();

        let mut expected = HashSet::new();
        for i in 0..12 {
            let session = Session::new(user_id, format!("t{i}"), "ip", "dev");
            expected.insert(session.id);
            store.put(&session, Duration::days(7)).await.unwrap();
        }

        let list = ListSessionsAction::with_config(store, ListSessionsConfig { page_size: 5 });

        let mut seen = Vec::new();
        let mut cursor = 0;
        let mut pages = 0;
        loop {
            let response = list.execute(&user_id, cursor).await.unwrap();
            seen.extend(response.sessions.iter().map(|s| s.id));
            pages += 1;
            if response.cursor == 0 {
                break;
            }
            cursor = response.cursor;
        }

        // 12 sessions and 12 index entries interleaved
        assert!(pages > 1);
        assert_eq!(seen.len(), 12);
        assert_eq!(seen.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[tokio::test]
    async fn test_listing_hides_tokens() {
        let store = CacheSessionStore::new(InMemoryCache::new());
        let session = Session::new(Uuid::new_v4(), "secret-refresh", "10.0.0.1", "ios");
        store.put(&session, Duration::days(7)).await.unwrap();

        let response = ListSessionsAction::new(store)
            .execute(&session.user_id, 0)
            .await
            .unwrap();

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("secret-refresh"));
        assert_eq!(response.sessions[0].device, "ios");
        assert_eq!(response.cursor, 0);
    }

    #[tokio::test]
    async fn test_no_sessions() {
        let list = ListSessionsAction::new(CacheSessionStore::new(InMemoryCache::new()));
        let response = list.execute(&Uuid::new_v4(), 0).await.unwrap();

        assert!(response.sessions.is_empty());
        assert_eq!(response.cursor, 0);
    }
}
