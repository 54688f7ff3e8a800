use uuid::Uuid;

use super::UserInfo;
use crate::{AccountRepository, AuthError};

pub struct GetAccountAction<A> {
    accounts: A,
}

impl<A: AccountRepository> GetAccountAction<A> {
    pub fn new(accounts: A) -> Self {
        GetAccountAction { accounts }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "get_account", skip_all, err)
    )]
    pub async fn execute(&self, user_id: &Uuid) -> Result<UserInfo, AuthError> {
        self.accounts
            .find_account_by_id(user_id)
            .await?
            .map(|account| UserInfo::from(&account))
            .ok_or(AuthError::AccountNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Account, MockAccountRepository};

    #[tokio::test]
    async fn test_get_account() {
        let repo = MockAccountRepository::new();
        let account = Account::mock("alice", "hash");
        repo.insert(account.clone());

        let get = GetAccountAction::new(repo);
        let info = get.execute(&account.id).await.unwrap();
        assert_eq!(info.username, "alice");
        assert_eq!(info.role, "user");

        assert_eq!(
            get.execute(&Uuid::new_v4()).await.unwrap_err(),
            AuthError::AccountNotFound
        );
    }
}
