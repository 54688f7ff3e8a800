use chrono::Utc;

use super::{AuthResponse, Credentials, UserInfo};
use crate::config::IdentityConfig;
use crate::crypto::PasswordHasher;
use crate::events::{AuthEvent, EventNotifier};
use crate::{AccountRepository, AuthError, Session, SessionStore, TokenIssuer};

#[derive(Debug, Clone, Default)]
pub struct LoginConfig {
    /// Refuse accounts that have not been confirmed yet.
    ///
    /// Default: false
    pub require_confirmed_account: bool,
}

impl LoginConfig {
    pub fn from_identity_config(config: &IdentityConfig) -> Self {
        Self {
            require_confirmed_account: config.require_confirmed_account,
        }
    }
}

/// Checks a username/password pair and opens a new session.
pub struct LoginAction<A, S, I, H> {
    accounts: A,
    sessions: S,
    issuer: I,
    hasher: H,
    notifier: EventNotifier,
    config: LoginConfig,
}

impl<A, S, I, H> LoginAction<A, S, I, H>
where
    A: AccountRepository,
    S: SessionStore,
    I: TokenIssuer,
    H: PasswordHasher,
{
    pub fn new(accounts: A, sessions: S, issuer: I, hasher: H, notifier: EventNotifier) -> Self {
        Self::with_config(
            accounts,
            sessions,
            issuer,
            hasher,
            notifier,
            LoginConfig::default(),
        )
    }

    pub fn with_config(
        accounts: A,
        sessions: S,
        issuer: I,
        hasher: H,
        notifier: EventNotifier,
        config: LoginConfig,
    ) -> Self {
        Self {
            accounts,
            sessions,
            issuer,
            hasher,
            notifier,
            config,
        }
    }

    /// # Returns
    ///
    /// - `Ok(AuthResponse)` - new session opened
    /// - `Err(AuthError::AccountNotFound)` - no such username
    /// - `Err(AuthError::InvalidCredentials)` - wrong password
    /// - `Err(AuthError::AccountNotConfirmed)` - confirmation required and missing
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "login", skip_all, err)
    )]
    pub async fn execute(
        &self,
        credentials: &Credentials,
        ip: &str,
        device: &str,
    ) -> Result<AuthResponse, AuthError> {
        let Some(account) = self
            .accounts
            .find_account_by_username(&credentials.username)
            .await?
        else {
            log::warn!(target: "vira_id", "msg=\"login failed\" reason=\"unknown account\"");
            return Err(AuthError::AccountNotFound);
        };

        if !self
            .hasher
            .verify(credentials.password.expose_secret(), &account.hashed_password)?
        {
            log::warn!(
                target: "vira_id",
                "msg=\"login failed\" reason=\"invalid password\" user_id={}",
                account.id
            );
            return Err(AuthError::InvalidCredentials);
        }

        if self.config.require_confirmed_account && !account.confirmed {
            return Err(AuthError::AccountNotConfirmed);
        }

        let tokens = self.issuer.issue_token_pair(&account.id)?;
        let session = Session::new(account.id, tokens.refresh_token.clone(), ip, device);
        self.sessions
            .put(&session, self.issuer.refresh_token_expiry())
            .await?;

        if let Err(e) = self.accounts.record_login(&account.id, Utc::now()).await {
            log::error!(
                target: "vira_id",
                "msg=\"failed to record last login\" user_id={} error=\"{e}\"",
                account.id
            );
        }

        self.notifier.notify(AuthEvent::UserLoggedIn {
            user_id: account.id,
            username: account.username.clone(),
            ip: ip.to_owned(),
            device: device.to_owned(),
            at: Utc::now(),
        });

        log::info!(
            target: "vira_id",
            "msg=\"login success\" user_id={} session_id={}",
            account.id,
            session.id
        );

        Ok(AuthResponse {
            tokens,
            user: UserInfo::from(&account),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockAccountRepository;
    use crate::actions::fixtures::{Fixture, PASSWORD, Store};
    use crate::crypto::Argon2Hasher;
    use crate::jwt::JwtService;

    fn action(
        fx: &Fixture,
        config: LoginConfig,
    ) -> LoginAction<MockAccountRepository, Store, JwtService, Argon2Hasher> {
        LoginAction::with_config(
            fx.accounts.clone(),
            fx.sessions.clone(),
            fx.issuer.clone(),
            fx.hasher.clone(),
            fx.notifier.clone(),
            config,
        )
    }

    #[tokio::test]
    async fn test_login_success() {
        let fx = Fixture::new();
        let account = fx.account("alice");
        let login = action(&fx, LoginConfig::default());

        let response = login
            .execute(&Credentials::new("alice", PASSWORD), "10.0.0.9", "firefox")
            .await
            .unwrap();

        assert_eq!(response.user.id, account.id);
        assert_eq!(response.tokens.expires_in, 15 * 60);

        let session = fx
            .sessions
            .get_by_refresh_token(response.tokens.refresh_token.expose_secret())
            .await
            .unwrap();
        assert_eq!(session.user_id, account.id);
        assert_eq!(session.device, "firefox");

        let stored = fx.accounts.accounts.lock().unwrap()[0].clone();
        assert!(stored.last_login_at.is_some());

        assert_eq!(fx.published_events().await, vec!["user.logged_in"]);
    }

    #[tokio::test]
    async fn test_login_unknown_account() {
        let fx = Fixture::new();
        let login = action(&fx, LoginConfig::default());

        let result = login
            .execute(&Credentials::new("ghost", PASSWORD), "ip", "dev")
            .await;
        assert_eq!(result.unwrap_err(), AuthError::AccountNotFound);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let fx = Fixture::new();
        fx.account("alice");
        let login = action(&fx, LoginConfig::default());

        let result = login
            .execute(&Credentials::new("alice", "Wr0ng!Pass"), "ip", "dev")
            .await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
        assert!(fx.sessions.cache().is_empty());
        assert!(fx.published_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_login_requires_confirmation_when_configured() {
        let fx = Fixture::new();
        let mut account = fx.account("alice");
        account.confirmed = false;
        fx.accounts.accounts.lock().unwrap()[0] = account;

        let strict = action(
            &fx,
            LoginConfig {
                require_confirmed_account: true,
            },
        );
        let result = strict
            .execute(&Credentials::new("alice", PASSWORD), "ip", "dev")
            .await;
        assert_eq!(result.unwrap_err(), AuthError::AccountNotConfirmed);

        let lenient = action(&fx, LoginConfig::default());
        assert!(
            lenient
                .execute(&Credentials::new("alice", PASSWORD), "ip", "dev")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_each_login_opens_a_session() {
        let fx = Fixture::new();
        let account = fx.account("alice");
        let login = action(&fx, LoginConfig::default());

        for _ in 0..3 {
            login
                .execute(&Credentials::new("alice", PASSWORD), "ip", "dev")
                .await
                .unwrap();
        }

        let sessions = fx.sessions.list_all_by_user(&account.id, 10).await.unwrap();
        assert_eq!(sessions.len(), 3);
    }
}
