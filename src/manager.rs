use uuid::Uuid;

use crate::actions::{
    AuthResponse, ChangePasswordAction, ConfirmAccountAction, Credentials, GetAccountAction,
    ListSessionsAction, ListSessionsConfig, LoginAction, LoginConfig, LogoutAction,
    RefreshTokenAction, RegisterAction, RevokeSessionAction, SessionsResponse, UserInfo,
};
use crate::config::IdentityConfig;
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::EventNotifier;
use crate::{AccountRepository, AuthError, SessionStore, TokenIssuer, TokenPair};

/// Entry point tying the account store, session store, token issuer and
/// event notifier together.
///
/// Holds only cloneable handles and read-only configuration, so one manager
/// can serve any number of concurrent calls.
#[derive(Clone)]
pub struct SessionManager<A, S, I, H = Argon2Hasher> {
    accounts: A,
    sessions: S,
    issuer: I,
    hasher: H,
    notifier: EventNotifier,
    config: IdentityConfig,
}

impl<A, S, I> SessionManager<A, S, I, Argon2Hasher>
where
    A: AccountRepository + Clone,
    S: SessionStore + Clone,
    I: TokenIssuer + Clone,
{
    /// Uses the default Argon2id parameters for password hashing.
    pub fn new(
        accounts: A,
        sessions: S,
        issuer: I,
        notifier: EventNotifier,
        config: IdentityConfig,
    ) -> Self {
        Self {
            accounts,
            sessions,
            issuer,
            hasher: Argon2Hasher::default(),
            notifier,
            config,
        }
    }
}

impl<A, S, I, H> SessionManager<A, S, I, H>
where
    A: AccountRepository + Clone,
    S: SessionStore + Clone,
    I: TokenIssuer + Clone,
    H: PasswordHasher + Clone,
{
    #[must_use]
    pub fn with_hasher<H2: PasswordHasher + Clone>(self, hasher: H2) -> SessionManager<A, S, I, H2> {
        SessionManager {
            accounts: self.accounts,
            sessions: self.sessions,
            issuer: self.issuer,
            hasher,
            notifier: self.notifier,
            config: self.config,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    pub async fn register(
        &self,
        credentials: &Credentials,
        ip: &str,
        device: &str,
    ) -> Result<AuthResponse, AuthError> {
        RegisterAction::new(
            self.accounts.clone(),
            self.sessions.clone(),
            self.issuer.clone(),
            self.hasher.clone(),
            self.notifier.clone(),
        )
        .execute(credentials, ip, device)
        .await
    }

    pub async fn login(
        &self,
        credentials: &Credentials,
        ip: &str,
        device: &str,
    ) -> Result<AuthResponse, AuthError> {
        LoginAction::with_config(
            self.accounts.clone(),
            self.sessions.clone(),
            self.issuer.clone(),
            self.hasher.clone(),
            self.notifier.clone(),
            LoginConfig::from_identity_config(&self.config),
        )
        .execute(credentials, ip, device)
        .await
    }

    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        ip: &str,
        device: &str,
    ) -> Result<TokenPair, AuthError> {
        RefreshTokenAction::new(
            self.sessions.clone(),
            self.issuer.clone(),
            self.notifier.clone(),
        )
        .execute(refresh_token, ip, device)
        .await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        LogoutAction::new(self.sessions.clone())
            .execute(refresh_token)
            .await
    }

    pub async fn revoke_session(&self, user_id: &Uuid, session_id: &Uuid) -> Result<(), AuthError> {
        RevokeSessionAction::new(self.sessions.clone())
            .execute(user_id, session_id)
            .await
    }

    pub async fn list_sessions(
        &self,
        user_id: &Uuid,
        cursor: u64,
    ) -> Result<SessionsResponse, AuthError> {
        ListSessionsAction::with_config(
            self.sessions.clone(),
            ListSessionsConfig::from_identity_config(&self.config),
        )
        .execute(user_id, cursor)
        .await
    }

    pub async fn confirm_account(&self, email: &str, token: &str) -> Result<(), AuthError> {
        ConfirmAccountAction::new(self.accounts.clone())
            .execute(email, token)
            .await
    }

    pub async fn change_password(
        &self,
        user_id: &Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        ChangePasswordAction::new(self.accounts.clone(), self.hasher.clone())
            .execute(user_id, current_password, new_password)
            .await
    }

    pub async fn get_account(&self, user_id: &Uuid) -> Result<UserInfo, AuthError> {
        GetAccountAction::new(self.accounts.clone())
            .execute(user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::fixtures::{Fixture, PASSWORD};

    #[tokio::test]
    async fn test_manager_lifecycle() {
        let fx = Fixture::new();
        let manager = SessionManager::new(
            fx.accounts.clone(),
            fx.sessions.clone(),
            fx.issuer.clone(),
            fx.notifier.clone(),
            IdentityConfig::default(),
        )
        .with_hasher(fx.hasher.clone());

        let registered = manager
            .register(&Credentials::new("alice", PASSWORD), "ip", "dev")
            .await
            .unwrap();
        let user_id = registered.user.id;

        let me = manager.get_account(&user_id).await.unwrap();
        assert_eq!(me, registered.user);

        let page = manager.list_sessions(&user_id, 0).await.unwrap();
        assert_eq!(page.sessions.len(), 1);

        manager
            .revoke_session(&user_id, &page.sessions[0].id)
            .await
            .unwrap();
        assert_eq!(
            manager
                .refresh_token(registered.tokens.refresh_token.expose_secret(), "ip", "dev")
                .await
                .unwrap_err(),
            AuthError::SessionNotFound
        );
    }

    #[tokio::test]
    async fn test_manager_honours_confirmation_setting() {
        let fx = Fixture::new();
        let config = IdentityConfig {
            require_confirmed_account: true,
            ..IdentityConfig::default()
        };
        let manager = SessionManager::new(
            fx.accounts.clone(),
            fx.sessions.clone(),
            fx.issuer.clone(),
            EventNotifier::noop(),
            config,
        )
        .with_hasher(fx.hasher.clone());

        manager
            .register(
                &Credentials::new("alice", PASSWORD).with_email("alice@example.com"),
                "ip",
                "dev",
            )
            .await
            .unwrap();

        let credentials = Credentials::new("alice", PASSWORD);
        assert_eq!(
            manager.login(&credentials, "ip", "dev").await.unwrap_err(),
            AuthError::AccountNotConfirmed
        );

        let token = fx.accounts.accounts.lock().unwrap()[0]
            .confirm_token
            .clone()
            .unwrap();
        manager.confirm_account("alice@example.com", &token).await.unwrap();
        assert!(manager.login(&credentials, "ip", "dev").await.is_ok());
    }
}
