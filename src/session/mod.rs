//! Session records and their storage on a shared key/value cache.
//!
//! A session lives under two keys written together with the same TTL:
//!
//! - `session:{user_id}:{session_id}` holds the JSON-encoded [`Session`]
//! - `refresh:{token}` holds the session key, so a refresh token resolves in
//!   one lookup
//!
//! [`KeyValueCache`] is the contract for the cache engine, [`InMemoryCache`]
//! its in-process implementation, and [`CacheSessionStore`] layers the
//! session operations on top.

mod cache;
mod memory_cache;
mod store;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SecretString;

pub use cache::KeyValueCache;
pub use memory_cache::InMemoryCache;
pub use store::{CacheSessionStore, SessionStore};

const SESSION_PREFIX: &str = "session:";
const INDEX_PREFIX: &str = "refresh:";

/// One authenticated client context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The refresh token bound to this session.
    pub token: SecretString,
    pub ip: String,
    pub device: String,
    pub login_time: DateTime<Utc>,
}

impl Session {
    /// Creates a session with a fresh random id and the current time.
    pub fn new(
        user_id: Uuid,
        token: impl Into<SecretString>,
        ip: impl Into<String>,
        device: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token: token.into(),
            ip: ip.into(),
            device: device.into(),
            login_time: Utc::now(),
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.user_id, &self.id)
    }
}

/// Cache key of a session record, `session:{user_id}:{session_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(user_id: &Uuid, session_id: &Uuid) -> Self {
        Self(format!("{SESSION_PREFIX}{user_id}:{session_id}"))
    }

    /// Prefix shared by every session key of `user_id`.
    pub fn user_prefix(user_id: &Uuid) -> String {
        format!("{SESSION_PREFIX}{user_id}:")
    }

    /// Accepts only strings shaped like a session key.
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(SESSION_PREFIX)?;
        let (user_id, session_id) = rest.split_once(':')?;
        Uuid::parse_str(user_id).ok()?;
        Uuid::parse_str(session_id).ok()?;
        Some(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache key of the reverse index entry for a refresh token.
pub(crate) fn index_key(token: &str) -> String {
    format!("{INDEX_PREFIX}{token}")
}

/// One page of a session listing.
///
/// `next_cursor == 0` means the scan is complete. A page may be empty while
/// the cursor is still non-zero.
#[derive(Debug, Clone, Default)]
pub struct SessionPage {
    pub sessions: Vec<Session>,
    pub next_cursor: u64,
}

impl SessionPage {
    pub fn is_last(&self) -> bool {
        self.next_cursor == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_format() {
        let user_id = Uuid::new_v4();
        let session = Session::new(user_id, "token", "10.0.0.1", "curl/8.0");

        let key = session.key();
        assert_eq!(key.as_str(), format!("session:{user_id}:{}", session.id));
        assert!(key.as_str().starts_with(&SessionKey::user_prefix(&user_id)));
        assert_eq!(index_key("abc"), "refresh:abc");
    }

    #[test]
    fn test_session_key_parse() {
        let key = SessionKey::new(&Uuid::new_v4(), &Uuid::new_v4());
        assert_eq!(SessionKey::parse(key.as_str()), Some(key));

        assert!(SessionKey::parse("session:nope").is_none());
        assert!(SessionKey::parse("refresh:abc").is_none());
        assert!(SessionKey::parse(&format!("session:{}:x", Uuid::new_v4())).is_none());
    }

    #[test]
    fn test_session_ids_are_fresh() {
        let user_id = Uuid::new_v4();
        let a = Session::new(user_id, "t1", "ip", "dev");
        let b = Session::new(user_id, "t2", "ip", "dev");
        assert_ne!(a.id, b.id);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_session_json_shape() {
        let session = Session::new(Uuid::new_v4(), "refresh-token", "10.0.0.1", "curl/8.0");
        let json: serde_json::Value = serde_json::to_value(&session).unwrap();

        for field in ["id", "user_id", "token", "ip", "device", "login_time"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["token"], "refresh-token");

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }
}
