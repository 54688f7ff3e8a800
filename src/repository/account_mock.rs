#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::AuthError;

use super::account::{Account, AccountRepository, NewAccount};

#[derive(Clone, Default)]
pub struct MockAccountRepository {
    pub accounts: Arc<Mutex<Vec<Account>>>,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account directly, bypassing uniqueness checks.
    pub fn insert(&self, account: Account) {
        self.accounts.lock().unwrap().push(account);
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    async fn find_account_by_id(&self, id: &Uuid) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.id == *id).cloned())
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().any(|a| a.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().any(|a| a.email.as_deref() == Some(email)))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();

        let taken = accounts.iter().any(|a| {
            a.username == account.username
                || (account.email.is_some() && a.email == account.email)
        });
        if taken {
            return Err(AuthError::DuplicateAccount);
        }

        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            hashed_password: account.hashed_password,
            role: account.role,
            confirmed: account.confirmed,
            confirm_token: account.confirm_token,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        accounts.push(created.clone());
        drop(accounts);

        Ok(created)
    }

    async fn confirm_account(&self, email: &str, token: &str) -> Result<(), AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.iter_mut().find(|a| {
            a.email.as_deref() == Some(email)
                && !a.confirmed
                && a.confirm_token.as_deref() == Some(token)
        });

        match account {
            Some(account) => {
                account.confirmed = true;
                account.confirm_token = None;
                account.updated_at = Utc::now();
                Ok(())
            }
            None => Err(AuthError::AccountNotFound),
        }
    }

    async fn update_password(&self, id: &Uuid, hashed_password: &str) -> Result<(), AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.id == *id) {
            hashed_password.clone_into(&mut account.hashed_password);
            account.updated_at = Utc::now();
            Ok(())
        } else {
            Err(AuthError::AccountNotFound)
        }
    }

    async fn record_login(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.id == *id) {
            account.last_login_at = Some(at);
            Ok(())
        } else {
            Err(AuthError::AccountNotFound)
        }
    }
}
