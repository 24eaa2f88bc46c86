//! Magic-link token collection.

use async_trait::async_trait;

use billfold_auth::MagicToken;

use crate::error::StoreResult;

#[async_trait]
pub trait AuthTokenStore: Send + Sync {
    async fn insert(&self, token: MagicToken) -> StoreResult<()>;

    /// Atomically consume a token: returns it only if it is unused and
    /// unexpired, marking it used in the same step so a link can never be
    /// redeemed twice.
    async fn consume(&self, token: &str) -> StoreResult<Option<MagicToken>>;

    /// Drop expired tokens; returns how many were removed.
    async fn purge_expired(&self) -> StoreResult<u64>;
}
