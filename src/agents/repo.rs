use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{instrument, Instrument};

use crate::agents::repo_types::{Account, NewAccount};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database unreachable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("database call exceeded its deadline")]
    TimedOut,
    #[error("database query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // agents.email is the only unique column an insert can collide on
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Self::DuplicateEmail,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err),
            _ => Self::Query(err),
        }
    }
}

/// Durable home of agent accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new agent and return its id. Uniqueness of `email` is decided by
    /// the storage engine, so callers must not look the email up beforehand.
    async fn create_account(&self, account: NewAccount<'_>) -> Result<i64, StoreError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn touch_last_seen(&self, id: i64, at: OffsetDateTime) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn create_account(&self, account: NewAccount<'_>) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO agents (email, password_hash, salt, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(account.email)
        .bind(account.password_hash)
        .bind(account.salt)
        .bind(account.name)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, salt, name, created_at, last_seen
            FROM agents
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .instrument(tracing::debug_span!("db.query", db.operation = "SELECT"))
        .await?;
        Ok(account)
    }

    async fn touch_last_seen(&self, id: i64, at: OffsetDateTime) -> Result<(), StoreError> {
        sqlx::query(r#"UPDATE agents SET last_seen = $2 WHERE id = $1"#)
            .bind(id)
            .bind(at)
            .execute(&self.db)
            .instrument(tracing::debug_span!("db.query", db.operation = "UPDATE"))
            .await?;
        Ok(())
    }
}
