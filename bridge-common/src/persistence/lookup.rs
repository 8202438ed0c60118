//! Account lookup collaborator

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{Account, AccountId};
use crate::Result;

/// Finds a single existing account by one of its unique keys
///
/// A missing account is `Ok(None)`, never an error.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>>;
}

#[async_trait]
impl<T: AccountLookup + ?Sized> AccountLookup for Arc<T> {
    async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>> {
        (**self).get_account(account_id).await
    }
}
