//! In-memory `AccountStore` for tests, with fault injection.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::agents::{
    repo::{AccountStore, StoreError},
    repo_types::{Account, NewAccount},
};

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Every call fails as if the pool could not reach the database.
    Unreachable,
    /// Every call fails with a non-connection query error.
    Broken,
    /// Every call sleeps this long before answering.
    Stall(Duration),
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Account>>,
    calls: AtomicUsize,
    fault: Option<Fault>,
    fail_touch: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::default()
        }
    }

    pub fn failing_touch() -> Self {
        Self {
            fail_touch: true,
            ..Self::default()
        }
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, email: &str) -> Option<Account> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }

    async fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            None => Ok(()),
            Some(Fault::Unreachable) => Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut)),
            Some(Fault::Broken) => Err(StoreError::Query(sqlx::Error::Protocol(
                "relation \"agents\" does not exist".into(),
            ))),
            Some(Fault::Stall(d)) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: NewAccount<'_>) -> Result<i64, StoreError> {
        self.enter().await?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let id = rows.len() as i64 + 1;
        rows.push(Account {
            id,
            email: account.email.to_string(),
            password_hash: account.password_hash.to_string(),
            salt: account.salt.to_string(),
            name: account.name.map(str::to_string),
            created_at: now,
            last_seen: now,
        });
        Ok(id)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.enter().await?;
        Ok(self.get(email))
    }

    async fn touch_last_seen(&self, id: i64, at: OffsetDateTime) -> Result<(), StoreError> {
        self.enter().await?;
        if self.fail_touch {
            return Err(StoreError::Unavailable(sqlx::Error::PoolClosed));
        }
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|a| a.id == id) {
            row.last_seen = at;
        }
        Ok(())
    }
}
