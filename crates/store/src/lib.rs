//! `billfold-store` — document persistence boundary.
//!
//! Traits for the three persisted collections (invoices, users, sign-in
//! tokens), an in-memory implementation for dev/tests, and a Postgres
//! (JSONB) implementation behind the `postgres` feature. Every invoice
//! operation is scoped by the owning user; cross-user access reads as
//! not-found.

pub mod error;
pub mod in_memory;
pub mod invoices;
pub mod tokens;
pub mod users;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use error::{StoreError, StoreResult};
pub use in_memory::{InMemoryInvoiceStore, InMemoryTokenStore, InMemoryUserStore};
pub use invoices::{InvoiceStore, ListQuery, Page, StoredInvoice, duplicate_document};
pub use tokens::AuthTokenStore;
pub use users::UserStore;

#[cfg(feature = "postgres")]
pub use postgres::{PgInvoiceStore, PgTokenStore, PgUserStore, migrate};
