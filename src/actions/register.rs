use chrono::Utc;

use super::{AuthResponse, Credentials, UserInfo};
use crate::crypto::{CONFIRM_TOKEN_LENGTH, PasswordHasher, generate_token};
use crate::events::{AuthEvent, EventNotifier};
use crate::repository::DEFAULT_ROLE;
use crate::validators::validate_registration;
use crate::{AccountRepository, AuthError, NewAccount, Session, SessionStore, TokenIssuer};

/// Creates an account and opens its first session.
///
/// The account starts unconfirmed with a random confirmation token; delivering
/// that token to the user is up to the caller.
pub struct RegisterAction<A, S, I, H> {
    accounts: A,
    sessions: S,
    issuer: I,
    hasher: H,
    notifier: EventNotifier,
}

impl<A, S, I, H> RegisterAction<A, S, I, H>
where
    A: AccountRepository,
    S: SessionStore,
    I: TokenIssuer,
    H: PasswordHasher,
{
    pub fn new(accounts: A, sessions: S, issuer: I, hasher: H, notifier: EventNotifier) -> Self {
        Self {
            accounts,
            sessions,
            issuer,
            hasher,
            notifier,
        }
    }

    /// # Returns
    ///
    /// - `Ok(AuthResponse)` - account created and logged in
    /// - `Err(AuthError::Validation(_))` - bad username, password or email
    /// - `Err(AuthError::DuplicateAccount)` - username or email taken
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "register", skip_all, err)
    )]
    pub async fn execute(
        &self,
        credentials: &Credentials,
        ip: &str,
        device: &str,
    ) -> Result<AuthResponse, AuthError> {
        let username = credentials.username.as_str();
        let password = credentials.password.expose_secret();
        let email = credentials.email();

        validate_registration(username, password, email)?;

        if self.accounts.exists_by_username(username).await? {
            return Err(AuthError::DuplicateAccount);
        }
        if let Some(email) = email {
            if self.accounts.exists_by_email(email).await? {
                return Err(AuthError::DuplicateAccount);
            }
        }

        let hashed_password = self.hasher.hash(password)?;
        let account = self
            .accounts
            .create_account(NewAccount {
                username: username.to_owned(),
                email: email.map(str::to_owned),
                hashed_password,
                role: DEFAULT_ROLE.to_owned(),
                confirmed: false,
                confirm_token: Some(generate_token(CONFIRM_TOKEN_LENGTH)),
            })
            .await?;

        let tokens = self.issuer.issue_token_pair(&account.id)?;
        let session = Session::new(account.id, tokens.refresh_token.clone(), ip, device);
        self.sessions
            .put(&session, self.issuer.refresh_token_expiry())
            .await?;

        self.notifier.notify(AuthEvent::UserRegistered {
            user_id: account.id,
            username: account.username.clone(),
            ip: ip.to_owned(),
            device: device.to_owned(),
            at: Utc::now(),
        });

        log::info!(
            target: "vira_id",
            "msg=\"registered\" user_id={} session_id={}",
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
    use crate::ValidationError;
    use crate::MockAccountRepository;
    use crate::actions::fixtures::{Fixture, PASSWORD, Store};
    use crate::crypto::Argon2Hasher;
    use crate::jwt::JwtService;

    fn action(fx: &Fixture) -> RegisterAction<MockAccountRepository, Store, JwtService, Argon2Hasher> {
        RegisterAction::new(
            fx.accounts.clone(),
            fx.sessions.clone(),
            fx.issuer.clone(),
            fx.hasher.clone(),
            fx.notifier.clone(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let fx = Fixture::new();
        let register = action(&fx);

        let response = register
            .execute(
                &Credentials::new("alice", PASSWORD).with_email("alice@example.com"),
                "10.0.0.1",
                "curl/8.0",
            )
            .await
            .unwrap();

        assert_eq!(response.user.username, "alice");
        assert_eq!(response.user.role, "user");

        let account = fx.accounts.accounts.lock().unwrap()[0].clone();
        assert_eq!(account.id, response.user.id);
        assert!(!account.confirmed);
        assert_eq!(account.confirm_token.as_ref().map(String::len), Some(32));
        assert_ne!(account.hashed_password, PASSWORD);

        let session = fx
            .sessions
            .get_by_refresh_token(response.tokens.refresh_token.expose_secret())
            .await
            .unwrap();
        assert_eq!(session.user_id, account.id);
        assert_eq!(session.ip, "10.0.0.1");
        assert_eq!(session.device, "curl/8.0");

        assert_eq!(fx.published_events().await, vec!["user.registered"]);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let fx = Fixture::new();
        let register = action(&fx);

        let cases = [
            (Credentials::new("al", PASSWORD), ValidationError::InvalidUsername),
            (Credentials::new("alice", "weakpass"), ValidationError::WeakPassword),
            (
                Credentials::new("alice", PASSWORD).with_email("not-an-email"),
                ValidationError::InvalidEmail,
            ),
        ];

        for (credentials, expected) in cases {
            assert_eq!(
                register.execute(&credentials, "ip", "dev").await.unwrap_err(),
                AuthError::Validation(expected)
            );
        }
        assert!(fx.accounts.is_empty());
        assert!(fx.sessions.cache().is_empty());
    }

    #[tokio::test]
    async fn test_empty_email_is_absent() {
        let fx = Fixture::new();
        let register = action(&fx);

        register
            .execute(&Credentials::new("alice", PASSWORD).with_email(""), "ip", "dev")
            .await
            .unwrap();

        assert_eq!(fx.accounts.accounts.lock().unwrap()[0].email, None);
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let fx = Fixture::new();
        let register = action(&fx);

        register
            .execute(
                &Credentials::new("alice", PASSWORD).with_email("alice@example.com"),
                "ip",
                "dev",
            )
            .await
            .unwrap();

        let same_name = register
            .execute(&Credentials::new("alice", PASSWORD), "ip", "dev")
            .await;
        assert_eq!(same_name.unwrap_err(), AuthError::DuplicateAccount);

        let same_email = register
            .execute(
                &Credentials::new("bob", PASSWORD).with_email("alice@example.com"),
                "ip",
                "dev",
            )
            .await;
        assert_eq!(same_email.unwrap_err(), AuthError::DuplicateAccount);

        assert_eq!(fx.accounts.len(), 1);
    }
}
