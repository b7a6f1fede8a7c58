use std::sync::Arc;

use crate::agents::{
    repo::{AccountStore, PgAccountStore},
    services::CredentialService,
};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub accounts: CredentialService,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> Self {
        let store = match &config.database {
            Some(database) => match db::connect(database, config.store_timeout) {
                Ok(pool) => {
                    db::init_schema(&pool).await;
                    Some(Arc::new(PgAccountStore::new(pool)) as Arc<dyn AccountStore>)
                }
                Err(e) => {
                    tracing::error!(error = %e, "database pool setup failed; running without persistence");
                    None
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set; running without persistence");
                None
            }
        };

        Self::new(CredentialService::new(store, config.store_timeout))
    }

    pub fn new(accounts: CredentialService) -> Self {
        Self { accounts }
    }
}
