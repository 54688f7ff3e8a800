//! One action per session lifecycle operation.
//!
//! Each action owns the collaborators it needs and exposes a single
//! `execute`. [`SessionManager`](crate::SessionManager) builds them per call;
//! they can also be used on their own.

pub mod change_password;
pub mod confirm_account;
pub mod get_account;
pub mod list_sessions;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod register;
pub mod revoke_session;

pub use change_password::ChangePasswordAction;
pub use confirm_account::ConfirmAccountAction;
pub use get_account::GetAccountAction;
pub use list_sessions::{ListSessionsAction, ListSessionsConfig};
pub use login::{LoginAction, LoginConfig};
pub use logout::LogoutAction;
pub use refresh_token::RefreshTokenAction;
pub use register::RegisterAction;
pub use revoke_session::RevokeSessionAction;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Account, SecretString, Session, TokenPair};

/// Username and password, plus an email at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    #[serde(default)]
    pub email: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The email, treating an empty string as absent.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

impl From<&Account> for UserInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            role: account.role.clone(),
        }
    }
}

/// Body returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub tokens: TokenPair,
    pub user: UserInfo,
}

/// A session as shown to its owner. The refresh token is left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub ip: String,
    pub device: String,
    pub login_time: DateTime<Utc>,
}

impl From<Session> for SessionInfo {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            ip: session.ip,
            device: session.device,
            login_time: session.login_time,
        }
    }
}

/// One page of a session listing. `cursor == 0` means there are no more pages.
#[derive(Debug, Clone, Serialize)]
pub struct SessionsResponse {
    pub cursor: u64,
    pub sessions: Vec<SessionInfo>,
}
