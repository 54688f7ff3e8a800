//! Configuration types for the identity core.
//!
//! # Example
//!
//! ```rust
//! use vira_id::config::{IdentityConfig, TokenConfig};
//! use chrono::Duration;
//!
//! let config = IdentityConfig {
//!     tokens: TokenConfig {
//!         access_token_expiry: Duration::minutes(5),
//!         ..Default::default()
//!     },
//!     require_confirmed_account: true,
//!     ..Default::default()
//! };
//! assert_eq!(config.sessions.list_page_size, 20);
//! ```

use chrono::Duration;

/// Top-level configuration handed to [`SessionManager`](crate::SessionManager).
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub tokens: TokenConfig,
    pub sessions: SessionConfig,
    pub notifier: NotifierConfig,

    /// Reject logins for accounts that have not confirmed their email.
    ///
    /// Default: false
    pub require_confirmed_account: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            tokens: TokenConfig::default(),
            sessions: SessionConfig::default(),
            notifier: NotifierConfig::default(),
            require_confirmed_account: false,
        }
    }
}

impl IdentityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Long-lived tokens and a single notifier worker, for local work.
    pub fn development() -> Self {
        Self {
            tokens: TokenConfig {
                access_token_expiry: Duration::hours(24),
                refresh_token_expiry: Duration::days(30),
            },
            sessions: SessionConfig { list_page_size: 50 },
            notifier: NotifierConfig {
                workers: 1,
                queue_capacity: 128,
                ..NotifierConfig::default()
            },
            require_confirmed_account: false,
        }
    }

    /// Short token lifetimes and mandatory account confirmation.
    pub fn strict() -> Self {
        Self {
            tokens: TokenConfig {
                access_token_expiry: Duration::minutes(5),
                refresh_token_expiry: Duration::days(1),
            },
            sessions: SessionConfig::default(),
            notifier: NotifierConfig {
                publish_timeout: std::time::Duration::from_secs(2),
                ..NotifierConfig::default()
            },
            require_confirmed_account: true,
        }
    }
}

/// Token lifetimes.
///
/// The refresh token lifetime doubles as the TTL of session records and of
/// their index entries.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Default: 15 minutes
    pub access_token_expiry: Duration,

    /// Default: 7 days
    pub refresh_token_expiry: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_expiry: Duration::minutes(15),
            refresh_token_expiry: Duration::days(7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Scan hint for one page of session listing. Pages may come back
    /// smaller or larger.
    ///
    /// Default: 20
    pub list_page_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { list_page_size: 20 }
    }
}

/// Settings for the background event worker pool.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Number of worker tasks. Default: 2
    pub workers: usize,
    /// Bounded queue length; events beyond it are dropped. Default: 1024
    pub queue_capacity: usize,
    /// Upper bound for a single publish call. Default: 5 seconds
    pub publish_timeout: std::time::Duration,
    /// Topic every event is published to. Default: `vira-events`
    pub topic: String,
    /// Value of `metadata.source` in event payloads. Default: `vira_id`
    pub source: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 1024,
            publish_timeout: std::time::Duration::from_secs(5),
            topic: "vira-events".to_owned(),
            source: "vira_id".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IdentityConfig::default();
        assert_eq!(config.tokens.access_token_expiry, Duration::minutes(15));
        assert_eq!(config.tokens.refresh_token_expiry, Duration::days(7));
        assert_eq!(config.sessions.list_page_size, 20);
        assert_eq!(config.notifier.workers, 2);
        assert_eq!(config.notifier.queue_capacity, 1024);
        assert_eq!(config.notifier.publish_timeout.as_secs(), 5);
        assert_eq!(config.notifier.topic, "vira-events");
        assert!(!config.require_confirmed_account);
    }

    #[test]
    fn test_presets() {
        let dev = IdentityConfig::development();
        assert!(dev.tokens.refresh_token_expiry > IdentityConfig::default().tokens.refresh_token_expiry);
        assert_eq!(dev.notifier.workers, 1);

        let strict = IdentityConfig::strict();
        assert!(strict.require_confirmed_account);
        assert!(strict.tokens.access_token_expiry < Duration::minutes(15));
    }
}
