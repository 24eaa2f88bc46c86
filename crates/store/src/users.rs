//! User collection.

use async_trait::async_trait;

use billfold_auth::User;
use billfold_core::UserId;

use crate::error::StoreResult;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Upsert on verified sign-in: creates the account on first login and
    /// stamps `email_verified`/`last_login` either way.
    async fn find_or_create_by_email(&self, email: &str) -> StoreResult<User>;

    async fn get(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}
