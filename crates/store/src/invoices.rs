//! Invoice collection: stored shape, list queries, and the store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billfold_core::{InvoiceId, UserId};
use billfold_invoices::Invoice;

use crate::error::StoreResult;

/// An invoice document plus its storage identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInvoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub invoice: Invoice,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredInvoice {
    /// Does this document match the list filters?
    pub fn matches(&self, query: &ListQuery) -> bool {
        if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
            let doc_status = self
                .invoice
                .details
                .as_ref()
                .and_then(|d| d.status.as_deref())
                .unwrap_or("");
            if !doc_status.eq_ignore_ascii_case(status) {
                return false;
            }
        }

        if let Some(needle) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            let haystacks = [
                self.invoice.invoice_number(),
                self.invoice.sender.as_ref().and_then(|p| p.name.as_deref()),
                self.invoice.receiver.as_ref().and_then(|p| p.name.as_deref()),
            ];
            if !haystacks
                .iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        true
    }
}

/// Pagination + filters for invoice listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    /// 1-based page number; 0 and absent both mean the first page.
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Exact (case-insensitive) match on `details.status`.
    pub status: Option<String>,
    /// Case-insensitive substring over invoice number and party names.
    pub search: Option<String>,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: u32 = 9;

    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.filter(|l| *l > 0).unwrap_or(Self::DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }
}

/// One page of results, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, query: &ListQuery) -> Self {
        let limit = query.limit();
        let total_pages = (total.div_ceil(u64::from(limit))).max(1) as u32;
        Self {
            items,
            total,
            page: query.page(),
            limit,
            total_pages,
        }
    }
}

/// Derive the document body for a duplicate: same content, `-COPY` suffixed
/// invoice number. Storage identity is assigned by `create`.
pub fn duplicate_document(source: &StoredInvoice) -> Invoice {
    let mut doc = source.invoice.clone();
    if let Some(details) = doc.details.as_mut() {
        if let Some(number) = details.invoice_number.as_mut() {
            number.push_str("-COPY");
        }
    }
    doc
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn create(&self, owner: UserId, doc: Invoice) -> StoreResult<StoredInvoice>;

    async fn get(&self, owner: UserId, id: InvoiceId) -> StoreResult<Option<StoredInvoice>>;

    /// Replaces the document body; `None` if absent (or owned by someone else).
    async fn update(&self, owner: UserId, id: InvoiceId, doc: Invoice)
    -> StoreResult<Option<StoredInvoice>>;

    /// `true` if a document was removed.
    async fn delete(&self, owner: UserId, id: InvoiceId) -> StoreResult<bool>;

    async fn list(&self, owner: UserId, query: ListQuery) -> StoreResult<Page<StoredInvoice>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use billfold_invoices::Details;

    fn stored(number: &str, status: &str, sender_name: &str) -> StoredInvoice {
        let now = Utc::now();
        StoredInvoice {
            id: InvoiceId::new(),
            user_id: UserId::new(),
            invoice: Invoice {
                sender: Some(billfold_invoices::Party {
                    name: Some(sender_name.to_string()),
                    ..Default::default()
                }),
                details: Some(Details {
                    invoice_number: Some(number.to_string()),
                    status: Some(status.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_filter_is_case_insensitive() {
        let doc = stored("INV-1", "Paid", "Acme");
        let query = ListQuery { status: Some("paid".into()), ..Default::default() };
        assert!(doc.matches(&query));

        let query = ListQuery { status: Some("draft".into()), ..Default::default() };
        assert!(!doc.matches(&query));
    }

    #[test]
    fn search_covers_number_and_party_names() {
        let doc = stored("INV-42", "draft", "Acme GmbH");
        for needle in ["inv-42", "acme"] {
            let query = ListQuery { search: Some(needle.into()), ..Default::default() };
            assert!(doc.matches(&query), "expected match for {needle}");
        }

        let query = ListQuery { search: Some("globex".into()), ..Default::default() };
        assert!(!doc.matches(&query));
    }

    #[test]
    fn empty_filters_match_everything() {
        let doc = stored("INV-1", "draft", "Acme");
        let query = ListQuery {
            status: Some(String::new()),
            search: Some(String::new()),
            ..Default::default()
        };
        assert!(doc.matches(&query));
    }

    #[test]
    fn query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 9);
        assert_eq!(query.offset(), 0);

        let query = ListQuery { page: Some(3), limit: Some(10), ..Default::default() };
        assert_eq!(query.offset(), 20);
    }

    #[test]
    fn duplicate_suffixes_the_invoice_number() {
        let doc = stored("INV-7", "draft", "Acme");
        let copy = duplicate_document(&doc);
        assert_eq!(
            copy.details.as_ref().unwrap().invoice_number.as_deref(),
            Some("INV-7-COPY")
        );
    }
}
