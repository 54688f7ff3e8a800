use uuid::Uuid;

use crate::crypto::PasswordHasher;
use crate::validators::validate_password;
use crate::{AccountRepository, AuthError};

pub struct ChangePasswordAction<A, H> {
    accounts: A,
    hasher: H,
}

impl<A: AccountRepository, H: PasswordHasher> ChangePasswordAction<A, H> {
    pub fn new(accounts: A, hasher: H) -> Self {
        Self { accounts, hasher }
    }

    /// Replaces the password after checking the current one.
    ///
    /// Existing sessions stay open.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - password changed
    /// - `Err(AuthError::AccountNotFound)` - no such account
    /// - `Err(AuthError::InvalidCredentials)` - current password is wrong
    /// - `Err(AuthError::Validation(_))` - new password is too weak
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_password", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user_id: &Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let account = self
            .accounts
            .find_account_by_id(user_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !self.hasher.verify(current_password, &account.hashed_password)? {
            return Err(AuthError::InvalidCredentials);
        }

        validate_password(new_password)?;

        let hashed = self.hasher.hash(new_password)?;
        self.accounts.update_password(&account.id, &hashed).await?;

        log::info!(
            target: "vira_id",
            "msg=\"password changed\" user_id={}",
            account.id
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;
    use crate::actions::fixtures::{Fixture, PASSWORD};

    #[tokio::test]
    async fn test_change_password() {
        let fx = Fixture::new();
        let account = fx.account("alice");
        let change = ChangePasswordAction::new(fx.accounts.clone(), fx.hasher.clone());

        change.execute(&account.id, PASSWORD, "N3w!Passw0rd").await.unwrap();

        let stored = fx.accounts.accounts.lock().unwrap()[0].clone();
        assert!(fx.hasher.verify("N3w!Passw0rd", &stored.hashed_password).unwrap());
        assert!(!fx.hasher.verify(PASSWORD, &stored.hashed_password).unwrap());
    }

    #[tokio::test]
    async fn test_change_password_failures() {
        let fx = Fixture::new();
        let account = fx.account("alice");
        let change = ChangePasswordAction::new(fx.accounts.clone(), fx.hasher.clone());

        assert_eq!(
            change.execute(&account.id, "Wr0ng!Pass", "N3w!Passw0rd").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            change.execute(&account.id, PASSWORD, "weak").await.unwrap_err(),
            AuthError::Validation(ValidationError::WeakPassword)
        );
        assert_eq!(
            change.execute(&Uuid::new_v4(), PASSWORD, "N3w!Passw0rd").await.unwrap_err(),
            AuthError::AccountNotFound
        );
    }
}
