use std::{future::Future, sync::Arc, time::Duration};

use axum::http::StatusCode;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::agents::{
    dto::{AuthSuccess, LoginRequest, RegisterRequest},
    password::{derive_hash, generate_salt, verify_password},
    repo::{AccountStore, StoreError},
    repo_types::NewAccount,
};

/// Every way a register or login call can fail, as seen by the client.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    #[error("database_unavailable")]
    DatabaseUnavailable,
    #[error("invalid_json")]
    InvalidJson,
    #[error("email_and_password_required")]
    EmailAndPasswordRequired,
    #[error("email_already_registered")]
    EmailAlreadyRegistered,
    #[error("invalid_credentials")]
    InvalidCredentials,
    #[error("internal_error")]
    Internal,
}

impl CredentialError {
    /// Wire code placed in the `error` field.
    pub fn code(self) -> &'static str {
        match self {
            Self::DatabaseUnavailable => "database_unavailable",
            Self::InvalidJson => "invalid_json",
            Self::EmailAndPasswordRequired => "email_and_password_required",
            Self::EmailAlreadyRegistered => "email_already_registered",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Internal => "internal_error",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            Self::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidJson | Self::EmailAndPasswordRequired => StatusCode::BAD_REQUEST,
            Self::EmailAlreadyRegistered => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::EmailAlreadyRegistered,
            StoreError::Unavailable(_) | StoreError::TimedOut => Self::DatabaseUnavailable,
            StoreError::Query(_) => Self::Internal,
        }
    }
}

/// Stateless register/login logic. Holds only the injected store handle, which
/// is `None` when the process runs without a database.
#[derive(Clone)]
pub struct CredentialService {
    store: Option<Arc<dyn AccountStore>>,
    store_timeout: Duration,
}

impl CredentialService {
    pub fn new(store: Option<Arc<dyn AccountStore>>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn ensure_available(&self) -> Result<&Arc<dyn AccountStore>, CredentialError> {
        self.store.as_ref().ok_or_else(|| {
            warn!("credential call without a configured database");
            CredentialError::DatabaseUnavailable
        })
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::TimedOut)?
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthSuccess, CredentialError> {
        let store = self.ensure_available()?;

        if req.email.is_empty() || req.password.is_empty() {
            warn!("register without email or password");
            return Err(CredentialError::EmailAndPasswordRequired);
        }

        let name = req.name.filter(|n| !n.trim().is_empty());
        let password = req.password;
        let (salt, password_hash) = run_blocking(move || {
            let salt = generate_salt()?;
            let hash = derive_hash(&password, &salt)?;
            Ok((salt, hash))
        })
        .await?;

        let new_account = NewAccount {
            email: &req.email,
            password_hash: &password_hash,
            salt: &salt,
            name: name.as_deref(),
        };
        let agent_id = match self.bounded(store.create_account(new_account)).await {
            Ok(id) => id,
            Err(StoreError::DuplicateEmail) => {
                warn!("email already registered");
                return Err(CredentialError::EmailAlreadyRegistered);
            }
            Err(e) => {
                error!(error = %e, "create_account failed");
                return Err(e.into());
            }
        };

        info!(agent_id, "agent registered");
        let greeting = name.as_deref().unwrap_or(req.email.as_str());
        Ok(AuthSuccess::new(
            agent_id,
            format!("Registration successful. Welcome, {greeting}!"),
        ))
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthSuccess, CredentialError> {
        let store = self.ensure_available()?;

        if req.email.is_empty() || req.password.is_empty() {
            warn!("login without email or password");
            return Err(CredentialError::InvalidCredentials);
        }

        let account = match self.bounded(store.find_account_by_email(&req.email)).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!("login unknown email");
                return Err(CredentialError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "find_account_by_email failed");
                return Err(e.into());
            }
        };

        let agent_id = account.id;
        let password = req.password;
        let matches = run_blocking(move || {
            verify_password(&password, &account.salt, &account.password_hash)
        })
        .await?;
        if !matches {
            warn!(agent_id, "login invalid password");
            return Err(CredentialError::InvalidCredentials);
        }

        if let Err(e) = self
            .bounded(store.touch_last_seen(agent_id, OffsetDateTime::now_utc()))
            .await
        {
            warn!(error = %e, agent_id, "last_seen update failed; continuing");
        }

        info!(agent_id, "agent logged in");
        Ok(AuthSuccess::new(agent_id, "Login successful"))
    }
}

/// Runs Argon2 work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, CredentialError>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(error = %e, "password hashing failed");
            Err(CredentialError::Internal)
        }
        Err(e) => {
            error!(error = %e, "hashing task did not complete");
            Err(CredentialError::Internal)
        }
    }
}
