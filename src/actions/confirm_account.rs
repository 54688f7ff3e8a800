use crate::{AccountRepository, AuthError};

/// Confirms an account with the token issued at registration.
pub struct ConfirmAccountAction<A> {
    accounts: A,
}

impl<A: AccountRepository> ConfirmAccountAction<A> {
    pub fn new(accounts: A) -> Self {
        ConfirmAccountAction { accounts }
    }

    /// `AccountNotFound` covers unknown emails, wrong tokens and accounts
    /// that are already confirmed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "confirm_account", skip_all, err)
    )]
    pub async fn execute(&self, email: &str, token: &str) -> Result<(), AuthError> {
        if email.is_empty() || token.is_empty() {
            return Err(AuthError::InvalidInput("email and token are required".to_owned()));
        }

        self.accounts.confirm_account(email, token).await?;

        log::info!(target: "vira_id", "msg=\"account confirmed\"");
        Ok(())
    }
}
