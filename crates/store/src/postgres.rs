//! Postgres-backed stores (JSONB documents).
//!
//! Invoices are stored as one JSONB document per row; filters reach into the
//! document with JSON operators so listing behaves exactly like the
//! in-memory implementation. Every query includes `user_id` in the WHERE
//! clause, which makes cross-user access impossible at the storage layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use billfold_auth::{MagicToken, Role, User};
use billfold_core::{InvoiceId, UserId};
use billfold_invoices::Invoice;

use crate::error::{StoreError, StoreResult};
use crate::invoices::{InvoiceStore, ListQuery, Page, StoredInvoice};
use crate::tokens::AuthTokenStore;
use crate::users::UserStore;

/// Create the schema if it does not exist yet.
pub async fn migrate(pool: &PgPool) -> StoreResult<()> {
    // Multiple statements, so this goes through the simple query protocol.
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS invoices (
            id          UUID PRIMARY KEY,
            user_id     UUID NOT NULL,
            doc         JSONB NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL
        );
        CREATE INDEX IF NOT EXISTS invoices_user_created_idx
            ON invoices (user_id, created_at DESC);

        CREATE TABLE IF NOT EXISTS users (
            id             UUID PRIMARY KEY,
            email          TEXT NOT NULL UNIQUE,
            name           TEXT,
            image          TEXT,
            role           TEXT NOT NULL,
            email_verified TIMESTAMPTZ,
            last_login     TIMESTAMPTZ,
            created_at     TIMESTAMPTZ NOT NULL,
            updated_at     TIMESTAMPTZ NOT NULL
        );

        CREATE TABLE IF NOT EXISTS auth_tokens (
            token       TEXT PRIMARY KEY,
            email       TEXT NOT NULL,
            expires_at  TIMESTAMPTZ NOT NULL,
            used        BOOLEAN NOT NULL DEFAULT FALSE,
            created_at  TIMESTAMPTZ NOT NULL
        );
        CREATE INDEX IF NOT EXISTS auth_tokens_expires_idx ON auth_tokens (expires_at);
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("migrate", e))?;

    Ok(())
}

fn map_sqlx_error(op: &str, e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StoreError::Conflict(format!("{op}: {db}"));
        }
    }
    StoreError::backend(format!("{op}: {e}"))
}

fn invoice_from_row(row: &PgRow) -> StoreResult<StoredInvoice> {
    let doc: serde_json::Value = row
        .try_get("doc")
        .map_err(|e| map_sqlx_error("invoice_from_row", e))?;
    let invoice: Invoice = serde_json::from_value(doc)
        .map_err(|e| StoreError::backend(format!("stored document does not parse: {e}")))?;

    Ok(StoredInvoice {
        id: InvoiceId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error("invoice_from_row", e))?),
        user_id: UserId::from_uuid(
            row.try_get("user_id")
                .map_err(|e| map_sqlx_error("invoice_from_row", e))?,
        ),
        invoice,
        created_at: row
            .try_get("created_at")
            .map_err(|e| map_sqlx_error("invoice_from_row", e))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| map_sqlx_error("invoice_from_row", e))?,
    })
}

const LIST_FILTERS: &str = r#"
    user_id = $1
    AND ($2::text IS NULL OR $2 = ''
         OR lower(doc->'details'->>'status') = lower($2))
    AND ($3::text IS NULL OR $3 = ''
         OR doc->'details'->>'invoiceNumber' ILIKE '%' || $3 || '%'
         OR doc->'sender'->>'name' ILIKE '%' || $3 || '%'
         OR doc->'receiver'->>'name' ILIKE '%' || $3 || '%')
"#;

#[derive(Debug, Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn create(&self, owner: UserId, doc: Invoice) -> StoreResult<StoredInvoice> {
        let id = InvoiceId::new();
        let now = Utc::now();
        let body = serde_json::to_value(&doc)
            .map_err(|e| StoreError::backend(format!("serialize document: {e}")))?;

        sqlx::query(
            "INSERT INTO invoices (id, user_id, doc, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)",
        )
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .bind(&body)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("invoices.create", e))?;

        Ok(StoredInvoice { id, user_id: owner, invoice: doc, created_at: now, updated_at: now })
    }

    async fn get(&self, owner: UserId, id: InvoiceId) -> StoreResult<Option<StoredInvoice>> {
        let row = sqlx::query(
            "SELECT id, user_id, doc, created_at, updated_at
             FROM invoices WHERE id = $1 AND user_id = $2",
        )
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("invoices.get", e))?;

        row.as_ref().map(invoice_from_row).transpose()
    }

    async fn update(
        &self,
        owner: UserId,
        id: InvoiceId,
        doc: Invoice,
    ) -> StoreResult<Option<StoredInvoice>> {
        let now = Utc::now();
        let body = serde_json::to_value(&doc)
            .map_err(|e| StoreError::backend(format!("serialize document: {e}")))?;

        let row = sqlx::query(
            "UPDATE invoices SET doc = $3, updated_at = $4
             WHERE id = $1 AND user_id = $2
             RETURNING id, user_id, doc, created_at, updated_at",
        )
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .bind(&body)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("invoices.update", e))?;

        row.as_ref().map(invoice_from_row).transpose()
    }

    async fn delete(&self, owner: UserId, id: InvoiceId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND user_id = $2")
            .bind(*id.as_uuid())
            .bind(*owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("invoices.delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, owner: UserId, query: ListQuery) -> StoreResult<Page<StoredInvoice>> {
        let count_sql = format!("SELECT COUNT(*) FROM invoices WHERE {LIST_FILTERS}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(*owner.as_uuid())
            .bind(query.status.as_deref())
            .bind(query.search.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("invoices.count", e))?;

        let list_sql = format!(
            "SELECT id, user_id, doc, created_at, updated_at
             FROM invoices WHERE {LIST_FILTERS}
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query(&list_sql)
            .bind(*owner.as_uuid())
            .bind(query.status.as_deref())
            .bind(query.search.as_deref())
            .bind(i64::from(query.limit()))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("invoices.list", e))?;

        let items = rows
            .iter()
            .map(invoice_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page::new(items, total.max(0) as u64, &query))
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let err = |e| map_sqlx_error("user_from_row", e);
    Ok(User {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(err)?),
        email: row.try_get("email").map_err(err)?,
        name: row.try_get("name").map_err(err)?,
        image: row.try_get("image").map_err(err)?,
        role: Role::new(row.try_get::<String, _>("role").map_err(err)?),
        email_verified: row
            .try_get::<Option<DateTime<Utc>>, _>("email_verified")
            .map_err(err)?,
        last_login: row.try_get::<Option<DateTime<Utc>>, _>("last_login").map_err(err)?,
        created_at: row.try_get("created_at").map_err(err)?,
        updated_at: row.try_get("updated_at").map_err(err)?,
    })
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_or_create_by_email(&self, email: &str) -> StoreResult<User> {
        let email = billfold_auth::normalize_email(email);
        let now = Utc::now();
        let candidate = User::new(&email, now);

        let row = sqlx::query(
            "INSERT INTO users (id, email, role, email_verified, last_login, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4, $4, $4)
             ON CONFLICT (email) DO UPDATE
                 SET email_verified = EXCLUDED.email_verified,
                     last_login = EXCLUDED.last_login,
                     updated_at = EXCLUDED.updated_at
             RETURNING id, email, name, image, role, email_verified, last_login, created_at, updated_at",
        )
        .bind(*candidate.id.as_uuid())
        .bind(&email)
        .bind(candidate.role.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.find_or_create", e))?;

        user_from_row(&row)
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, image, role, email_verified, last_login, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.get", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = billfold_auth::normalize_email(email);
        let row = sqlx::query(
            "SELECT id, email, name, image, role, email_verified, last_login, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.get_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[derive(Debug, Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthTokenStore for PgTokenStore {
    async fn insert(&self, token: MagicToken) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO auth_tokens (token, email, expires_at, used, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&token.token)
        .bind(&token.email)
        .bind(token.expires_at)
        .bind(token.used)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("tokens.insert", e))?;

        Ok(())
    }

    async fn consume(&self, token: &str) -> StoreResult<Option<MagicToken>> {
        // Single statement so a link can never be redeemed twice.
        let row = sqlx::query(
            "UPDATE auth_tokens SET used = TRUE
             WHERE token = $1 AND used = FALSE AND expires_at > $2
             RETURNING token, email, expires_at, used, created_at",
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("tokens.consume", e))?;

        row.map(|row| -> StoreResult<MagicToken> {
            let err = |e| map_sqlx_error("tokens.consume", e);
            Ok(MagicToken {
                token: row.try_get("token").map_err(err)?,
                email: row.try_get("email").map_err(err)?,
                expires_at: row.try_get("expires_at").map_err(err)?,
                used: row.try_get("used").map_err(err)?,
                created_at: row.try_get("created_at").map_err(err)?,
            })
        })
        .transpose()
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("tokens.purge_expired", e))?;

        Ok(result.rows_affected())
    }
}
