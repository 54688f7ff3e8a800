//! In-process [`KeyValueCache`].
//!
//! Suitable for tests and single-instance deployments. Entries expire lazily:
//! reads ignore expired entries and writes sweep them out periodically.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::KeyValueCache;
use crate::AuthError;

/// Every this many writes, expired entries are swept.
const SWEEP_INTERVAL: u64 = 256;

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
    /// Insertion position, stable across overwrites. Scan cursors point here.
    seq: u64,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Default)]
struct State {
    entries: HashMap<String, Entry>,
    order: BTreeMap<u64, String>,
    /// Last assigned sequence number. Sequences start at 1 so cursor 0 is free.
    last_seq: u64,
    writes: u64,
}

impl State {
    fn live(&self, key: &str, now: DateTime<Utc>) -> Option<&Entry> {
        self.entries.get(key).filter(|e| e.is_live(now))
    }

    fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }

    fn insert(&mut self, key: &str, value: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(key) {
            if entry.is_live(now) {
                entry.value = value.to_owned();
                entry.expires_at = expires_at;
                return;
            }
        }

        self.remove(key);
        self.last_seq += 1;
        self.order.insert(self.last_seq, key.to_owned());
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at,
                seq: self.last_seq,
            },
        );
    }

    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }
}

/// [`KeyValueCache`] backed by a `HashMap` behind a `RwLock`.
///
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryCache {
    state: Arc<RwLock<State>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.state
            .read()
            .map(|s| s.entries.values().filter(|e| e.is_live(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops expired entries now instead of waiting for the next sweep.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreError` if the lock is poisoned.
    pub fn purge_expired(&self) -> Result<usize, AuthError> {
        Ok(self.state.write().map_err(poisoned)?.sweep(Utc::now()))
    }
}

fn poisoned<T>(_: T) -> AuthError {
    AuthError::StoreError("Lock poisoned".to_owned())
}

#[async_trait]
impl KeyValueCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.live(key, Utc::now()).map(|e| e.value.clone()))
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn set_many(
        &self,
        entries: &[(String, String)],
        ttl: Duration,
    ) -> Result<(), AuthError> {
        if ttl <= Duration::zero() {
            return Err(AuthError::InvalidInput("TTL must be positive".to_owned()));
        }

        let now = Utc::now();
        let expires_at = now + ttl;
        let mut state = self.state.write().map_err(poisoned)?;

        for (key, value) in entries {
            state.insert(key, value, expires_at, now);
        }

        state.writes += 1;
        if state.writes % SWEEP_INTERVAL == 0 {
            state.sweep(now);
        }

        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn delete(&self, keys: &[String]) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut state = self.state.write().map_err(poisoned)?;

        let mut removed = 0;
        for key in keys {
            if state.remove(key).is_some_and(|e| e.is_live(now)) {
                removed += 1;
            }
        }

        Ok(removed)
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn compare_and_delete(
        &self,
        guard_key: &str,
        expected: &str,
        also_delete: &[String],
    ) -> Result<bool, AuthError> {
        let now = Utc::now();
        let mut state = self.state.write().map_err(poisoned)?;

        let matches = state
            .live(guard_key, now)
            .is_some_and(|e| e.value == expected);
        if !matches {
            return Ok(false);
        }

        state.remove(guard_key);
        for key in also_delete {
            state.remove(key);
        }

        Ok(true)
    }

    async fn scan(
        &self,
        cursor: u64,
        prefix: &str,
        count: usize,
    ) -> Result<(Vec<String>, u64), AuthError> {
        let now = Utc::now();
        let state = self.state.read().map_err(poisoned)?;

        let mut examined = state.order.range(cursor..);
        let mut keys = Vec::new();

        for (_, key) in examined.by_ref().take(count.max(1)) {
            if key.starts_with(prefix) && state.live(key, now).is_some() {
                keys.push(key.clone());
            }
        }

        let next_cursor = examined.next().map_or(0, |(seq, _)| *seq);
        Ok((keys, next_cursor))
    }
}
