//! Postgres-backed account store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation(field)` by constraint name |
//! | Database (other) | any other | `Backend` |
//! | RowNotFound | N/A | `NoRows` |
//! | PoolTimedOut / PoolClosed / Io | N/A | `Unavailable` |
//! | Other | N/A | `Backend` |
//!
//! Soft-deleted rows (`deleted_at IS NOT NULL`) are invisible to every query.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use bridge_auth::{AccountStore, StoreError, UniqueField};
use bridge_core::{Account, AccountId, AccountMeta, AccountStatus, Credentials, NewAccount};

const SCHEMA: &str = include_str!("../../migrations/0001_accounts.sql");

const EMAIL_CONSTRAINT: &str = "accounts_email_key";
const PHONE_NUMBER_CONSTRAINT: &str = "accounts_phone_number_key";

const ACCOUNT_COLUMNS: &str =
    "id, name, email, phone_number, status, meta, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `accounts` table if it does not exist.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn fetch_account(&self, operation: &str, column: &str, value: &str) -> Result<Account, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        account_from_row(&row)
    }

    async fn taken(&self, operation: &str, column: &str, value: &str) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE {column} = $1 AND deleted_at IS NULL)"
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self), err)]
    async fn authenticate(&self, email: &str) -> Result<Credentials, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash
            FROM accounts
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("authenticate", e))?;

        Ok(Credentials {
            id: AccountId::from_uuid(row.try_get("id").map_err(decode_error)?),
            email: row.try_get("email").map_err(decode_error)?,
            password_hash: row.try_get("password_hash").map_err(decode_error)?,
        })
    }

    #[instrument(skip(self, account), fields(email = %account.email), err)]
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let id = AccountId::new();
        let meta = serde_json::to_value(&account.meta)
            .map_err(|e| StoreError::Backend(format!("failed to encode account meta: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, name, email, phone_number, password_hash,
                status, meta, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.phone_number)
        .bind(&account.password_hash)
        .bind(account.status.as_i32())
        .bind(meta)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        Ok(account.into_account(id))
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn find_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        let sql =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND deleted_at IS NULL");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        account_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError> {
        self.fetch_account("find_by_email", "email", email).await
    }

    #[instrument(skip(self), err)]
    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Account, StoreError> {
        self.fetch_account("find_by_phone_number", "phone_number", phone_number)
            .await
    }

    #[instrument(skip(self), err)]
    async fn exists(&self, email: &str, phone_number: &str) -> Result<(), StoreError> {
        if self.taken("exists", "email", email).await? {
            return Err(StoreError::UniqueViolation(UniqueField::Email));
        }
        if self.taken("exists", "phone_number", phone_number).await? {
            return Err(StoreError::UniqueViolation(UniqueField::PhoneNumber));
        }
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    async fn update(&self, account: &mut Account) -> Result<(), StoreError> {
        let updated_at = Utc::now();
        let meta = serde_json::to_value(&account.meta)
            .map_err(|e| StoreError::Backend(format!("failed to encode account meta: {e}")))?;

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET name = $2, email = $3, phone_number = $4, status = $5, meta = $6, updated_at = $7
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(*account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.phone_number)
        .bind(account.status.as_i32())
        .bind(meta)
        .bind(updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRows);
        }
        account.updated_at = updated_at;
        Ok(())
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let status: i32 = row.try_get("status").map_err(decode_error)?;
    let status = AccountStatus::from_i32(status)
        .ok_or_else(|| StoreError::Backend(format!("unknown account status {status}")))?;
    let meta: serde_json::Value = row.try_get("meta").map_err(decode_error)?;
    let meta: AccountMeta = serde_json::from_value(meta)
        .map_err(|e| StoreError::Backend(format!("failed to decode account meta: {e}")))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(decode_error)?;

    Ok(Account {
        id: AccountId::from_uuid(row.try_get("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        email: row.try_get("email").map_err(decode_error)?,
        phone_number: row.try_get("phone_number").map_err(decode_error)?,
        status,
        meta,
        created_at,
        updated_at,
    })
}

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to decode account row: {err}"))
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let field = match db_err.constraint() {
                    Some(EMAIL_CONSTRAINT) => UniqueField::Email,
                    Some(PHONE_NUMBER_CONSTRAINT) => UniqueField::PhoneNumber,
                    Some(other) => UniqueField::Other(other.to_string()),
                    None => UniqueField::Other(String::new()),
                };
                return StoreError::UniqueViolation(field);
            }
            StoreError::Backend(format!(
                "database error in {operation}: {}",
                db_err.message()
            ))
        }
        sqlx::Error::RowNotFound => StoreError::NoRows,
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}
