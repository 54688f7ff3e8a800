use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use super::{KeyValueCache, Session, SessionKey, SessionPage, index_key};
use crate::AuthError;
use crate::crypto::token_fingerprint;

/// Session persistence with a reverse index from refresh token to session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes the record and its index entry in one atomic call, both with `ttl`.
    async fn put(&self, session: &Session, ttl: Duration) -> Result<(), AuthError>;

    /// Resolves a refresh token to its session.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` if the index entry or the record is missing,
    /// `CorruptSession` with the record key if the record cannot be decoded,
    /// and `StoreError` if the cache fails.
    async fn get_by_refresh_token(&self, token: &str) -> Result<Session, AuthError>;

    /// `CorruptSession` if the record cannot be decoded.
    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, AuthError>;

    /// Removes a record. Absent keys are fine.
    async fn delete(&self, key: &SessionKey) -> Result<(), AuthError>;

    /// Removes an index entry. Absent entries are fine.
    async fn delete_index(&self, token: &str) -> Result<(), AuthError>;

    /// Removes the index entry of `token` together with the record at `key`,
    /// but only while the index still points at `key`.
    ///
    /// Returns `false` when some other caller got there first.
    async fn remove_if_current(&self, token: &str, key: &SessionKey) -> Result<bool, AuthError>;

    /// One page of `user_id`'s sessions. Start with cursor `0`; a returned
    /// `next_cursor` of `0` ends the listing.
    async fn list_by_user(
        &self,
        user_id: &Uuid,
        cursor: u64,
        page_size: usize,
    ) -> Result<SessionPage, AuthError>;

    /// Follows [`list_by_user`](Self::list_by_user) to completion.
    async fn list_all_by_user(
        &self,
        user_id: &Uuid,
        page_size: usize,
    ) -> Result<Vec<Session>, AuthError> {
        let mut sessions = Vec::new();
        let mut cursor = 0;

        loop {
            let page = self.list_by_user(user_id, cursor, page_size).await?;
            sessions.extend(page.sessions);

            if page.next_cursor == 0 {
                return Ok(sessions);
            }
            cursor = page.next_cursor;
        }
    }
}

/// [`SessionStore`] on any [`KeyValueCache`].
#[derive(Clone)]
pub struct CacheSessionStore<C: KeyValueCache> {
    cache: C,
}

impl<C: KeyValueCache> CacheSessionStore<C> {
    pub fn new(cache: C) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    async fn load(&self, key: &str) -> Result<Option<Session>, AuthError> {
        let Some(raw) = self.cache.get(key).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw).map(Some).map_err(|e| {
            log::error!(
                target: "vira_id",
                "msg=\"undecodable session record\" key={key} error=\"{e}\""
            );
            AuthError::CorruptSession(key.to_owned())
        })
    }
}

#[async_trait]
impl<C: KeyValueCache> SessionStore for CacheSessionStore<C> {
    async fn put(&self, session: &Session, ttl: Duration) -> Result<(), AuthError> {
        let record = serde_json::to_string(session)
            .map_err(|e| AuthError::StoreError(format!("encode session: {e}")))?;
        let key = session.key();

        let entries = [
            (key.as_str().to_owned(), record),
            (
                index_key(session.token.expose_secret()),
                key.as_str().to_owned(),
            ),
        ];

        self.cache.set_many(&entries, ttl).await
    }

    async fn get_by_refresh_token(&self, token: &str) -> Result<Session, AuthError> {
        let Some(raw_key) = self.cache.get(&index_key(token)).await? else {
            return Err(AuthError::SessionNotFound);
        };

        let session = self.load(&raw_key).await?.ok_or(AuthError::SessionNotFound)?;

        if session.token.expose_secret() != token {
            log::warn!(
                target: "vira_id",
                "msg=\"index points at foreign session\" token={} key={raw_key}",
                token_fingerprint(token)
            );
            return Err(AuthError::SessionNotFound);
        }

        Ok(session)
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, AuthError> {
        self.load(key.as_str()).await
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), AuthError> {
        self.cache.delete(&[key.as_str().to_owned()]).await?;
        Ok(())
    }

    async fn delete_index(&self, token: &str) -> Result<(), AuthError> {
        self.cache.delete(&[index_key(token)]).await?;
        Ok(())
    }

    async fn remove_if_current(&self, token: &str, key: &SessionKey) -> Result<bool, AuthError> {
        self.cache
            .compare_and_delete(&index_key(token), key.as_str(), &[key.as_str().to_owned()])
            .await
    }

    async fn list_by_user(
        &self,
        user_id: &Uuid,
        cursor: u64,
        page_size: usize,
    ) -> Result<SessionPage, AuthError> {
        let prefix = SessionKey::user_prefix(user_id);
        let (keys, next_cursor) = self.cache.scan(cursor, &prefix, page_size).await?;

        let mut sessions = Vec::with_capacity(keys.len());
        for key in keys {
            // gone since the scan
            let Some(raw) = self.cache.get(&key).await? else {
                continue;
            };

            match serde_json::from_str::<Session>(&raw) {
                Ok(session) => sessions.push(session),
                Err(e) => log::warn!(
                    target: "vira_id",
                    "msg=\"skipping undecodable session\" key={key} error=\"{e}\""
                ),
            }
        }

        Ok(SessionPage {
            sessions,
            next_cursor,
        })
    }
}
