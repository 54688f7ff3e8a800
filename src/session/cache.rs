use async_trait::async_trait;
use chrono::Duration;

use crate::AuthError;

/// Operations the session store needs from a shared cache engine.
///
/// Implementations map engine failures to `AuthError::StoreError`.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// Writes every entry with the same TTL, all or nothing.
    ///
    /// A non-positive `ttl` is rejected with `AuthError::InvalidInput`.
    async fn set_many(&self, entries: &[(String, String)], ttl: Duration)
    -> Result<(), AuthError>;

    /// Returns how many of `keys` existed.
    async fn delete(&self, keys: &[String]) -> Result<u64, AuthError>;

    /// Atomically deletes `guard_key` and `also_delete` if `guard_key` currently
    /// holds `expected`. Returns whether the deletion happened.
    async fn compare_and_delete(
        &self,
        guard_key: &str,
        expected: &str,
        also_delete: &[String],
    ) -> Result<bool, AuthError>;

    /// Incremental scan over keys starting with `prefix`.
    ///
    /// Pass `0` to start; a returned cursor of `0` ends the scan. `count` is a
    /// hint for how much work one call does, so a call may return no keys and
    /// a non-zero cursor. Keys present for the whole scan are returned at
    /// least once; keys added or removed meanwhile may or may not appear.
    async fn scan(
        &self,
        cursor: u64,
        prefix: &str,
        count: usize,
    ) -> Result<(Vec<String>, u64), AuthError>;
}
