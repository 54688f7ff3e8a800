use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthError;

/// Role assigned to self-registered accounts.
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: String,
    pub confirmed: bool,
    #[serde(skip_serializing)]
    pub confirm_token: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating an account. The store assigns the id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: Option<String>,
    pub hashed_password: String,
    pub role: String,
    pub confirmed: bool,
    pub confirm_token: Option<String>,
}

#[cfg(any(test, feature = "mocks"))]
impl Account {
    pub fn mock(username: &str, hashed_password: &str) -> Self {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            email: None,
            hashed_password: hashed_password.to_owned(),
            role: DEFAULT_ROLE.to_owned(),
            confirmed: true,
            confirm_token: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_account_by_id(&self, id: &Uuid) -> Result<Option<Account>, AuthError>;
    async fn find_account_by_username(&self, username: &str)
    -> Result<Option<Account>, AuthError>;
    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;

    /// Fails with `DuplicateAccount` if the username or email is taken.
    async fn create_account(&self, account: NewAccount) -> Result<Account, AuthError>;

    /// Marks the unconfirmed account with this email confirmed if `token`
    /// matches. `AccountNotFound` otherwise.
    async fn confirm_account(&self, email: &str, token: &str) -> Result<(), AuthError>;

    async fn update_password(&self, id: &Uuid, hashed_password: &str) -> Result<(), AuthError>;
    async fn record_login(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), AuthError>;
}
