//! In-memory store implementations for dev/tests.
//!
//! Plain `RwLock<HashMap>` maps; locks are never held across an await.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use billfold_auth::{MagicToken, User};
use billfold_core::{InvoiceId, UserId};
use billfold_invoices::Invoice;

use crate::error::{StoreError, StoreResult};
use crate::invoices::{InvoiceStore, ListQuery, Page, StoredInvoice};
use crate::tokens::AuthTokenStore;
use crate::users::UserStore;

#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    inner: RwLock<HashMap<InvoiceId, StoredInvoice>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> StoreError {
        StoreError::backend("invoice store lock poisoned")
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn create(&self, owner: UserId, doc: Invoice) -> StoreResult<StoredInvoice> {
        let now = Utc::now();
        let stored = StoredInvoice {
            id: InvoiceId::new(),
            user_id: owner,
            invoice: doc,
            created_at: now,
            updated_at: now,
        };

        let mut map = self.inner.write().map_err(|_| Self::lock_err())?;
        map.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, owner: UserId, id: InvoiceId) -> StoreResult<Option<StoredInvoice>> {
        let map = self.inner.read().map_err(|_| Self::lock_err())?;
        Ok(map.get(&id).filter(|doc| doc.user_id == owner).cloned())
    }

    async fn update(
        &self,
        owner: UserId,
        id: InvoiceId,
        doc: Invoice,
    ) -> StoreResult<Option<StoredInvoice>> {
        let mut map = self.inner.write().map_err(|_| Self::lock_err())?;
        match map.get_mut(&id).filter(|existing| existing.user_id == owner) {
            Some(existing) => {
                existing.invoice = doc;
                existing.updated_at = Utc::now();
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, owner: UserId, id: InvoiceId) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| Self::lock_err())?;
        let owned = map.get(&id).is_some_and(|doc| doc.user_id == owner);
        if owned {
            map.remove(&id);
        }
        Ok(owned)
    }

    async fn list(&self, owner: UserId, query: ListQuery) -> StoreResult<Page<StoredInvoice>> {
        let map = self.inner.read().map_err(|_| Self::lock_err())?;

        let mut matched: Vec<StoredInvoice> = map
            .values()
            .filter(|doc| doc.user_id == owner && doc.matches(&query))
            .cloned()
            .collect();

        // Newest first; id breaks created_at ties deterministically.
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();

        Ok(Page::new(items, total, &query))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> StoreError {
        StoreError::backend("user store lock poisoned")
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_or_create_by_email(&self, email: &str) -> StoreResult<User> {
        let email = billfold_auth::normalize_email(email);
        let now = Utc::now();

        let mut map = self.inner.write().map_err(|_| Self::lock_err())?;
        if let Some(user) = map.values_mut().find(|u| u.email == email) {
            user.record_login(now);
            return Ok(user.clone());
        }

        let mut user = User::new(&email, now);
        user.record_login(now);
        map.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let map = self.inner.read().map_err(|_| Self::lock_err())?;
        Ok(map.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = billfold_auth::normalize_email(email);
        let map = self.inner.read().map_err(|_| Self::lock_err())?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    inner: RwLock<HashMap<String, MagicToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> StoreError {
        StoreError::backend("token store lock poisoned")
    }
}

#[async_trait]
impl AuthTokenStore for InMemoryTokenStore {
    async fn insert(&self, token: MagicToken) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| Self::lock_err())?;
        map.insert(token.token.clone(), token);
        Ok(())
    }

    async fn consume(&self, token: &str) -> StoreResult<Option<MagicToken>> {
        let now = Utc::now();
        let mut map = self.inner.write().map_err(|_| Self::lock_err())?;
        match map.get_mut(token) {
            Some(record) if record.is_consumable(now) => {
                record.used = true;
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let now = Utc::now();
        let mut map = self.inner.write().map_err(|_| Self::lock_err())?;
        let before = map.len();
        map.retain(|_, record| !record.is_expired(now));
        Ok((before - map.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billfold_invoices::Details;
    use chrono::Duration;

    fn doc(number: &str, status: &str) -> Invoice {
        Invoice {
            details: Some(Details {
                invoice_number: Some(number.to_string()),
                status: Some(status.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let store = InMemoryInvoiceStore::new();
        let owner = UserId::new();

        let created = store.create(owner, doc("INV-1", "draft")).await.unwrap();
        let fetched = store.get(owner, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.invoice.invoice_number(), Some("INV-1"));

        let updated = store
            .update(owner, created.id, doc("INV-1", "paid"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.invoice.details.as_ref().unwrap().status.as_deref(),
            Some("paid")
        );

        assert!(store.delete(owner, created.id).await.unwrap());
        assert!(store.get(owner, created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn documents_are_owner_scoped() {
        let store = InMemoryInvoiceStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let created = store.create(alice, doc("INV-1", "draft")).await.unwrap();

        assert!(store.get(bob, created.id).await.unwrap().is_none());
        assert!(store.update(bob, created.id, doc("X", "paid")).await.unwrap().is_none());
        assert!(!store.delete(bob, created.id).await.unwrap());
        // Still there for the owner.
        assert!(store.get(alice, created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_paginates_and_filters() {
        let store = InMemoryInvoiceStore::new();
        let owner = UserId::new();

        for i in 0..12 {
            let status = if i % 2 == 0 { "draft" } else { "paid" };
            store.create(owner, doc(&format!("INV-{i}"), status)).await.unwrap();
        }

        let page = store.list(owner, ListQuery::default()).await.unwrap();
        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 9);
        assert_eq!(page.total_pages, 2);

        let page2 = store
            .list(owner, ListQuery { page: Some(2), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page2.items.len(), 3);

        let paid = store
            .list(owner, ListQuery { status: Some("paid".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(paid.total, 6);

        let searched = store
            .list(owner, ListQuery { search: Some("inv-11".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(searched.total, 1);
    }

    #[tokio::test]
    async fn upsert_on_login_is_idempotent_per_email() {
        let store = InMemoryUserStore::new();

        let first = store.find_or_create_by_email("User@Example.com").await.unwrap();
        let second = store.find_or_create_by_email("user@example.com").await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.email_verified.is_some());
        assert_eq!(store.get_by_email("USER@example.com").await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn tokens_are_single_use() {
        let store = InMemoryTokenStore::new();
        let token = MagicToken::issue("a@b.co", Utc::now());
        let key = token.token.clone();
        store.insert(token).await.unwrap();

        assert!(store.consume(&key).await.unwrap().is_some());
        assert!(store.consume(&key).await.unwrap().is_none());
        assert!(store.consume("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_tokens_never_consume_and_purge() {
        let store = InMemoryTokenStore::new();
        let mut token = MagicToken::issue("a@b.co", Utc::now());
        token.expires_at = Utc::now() - Duration::minutes(1);
        let key = token.token.clone();
        store.insert(token).await.unwrap();

        assert!(store.consume(&key).await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
    }
}
