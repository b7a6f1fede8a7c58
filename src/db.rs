use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;

/// Build the pool without connecting; an unreachable database surfaces per
/// request instead of blocking startup.
pub fn connect(config: &DatabaseConfig, acquire_timeout: Duration) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(&config.url)
        .context("parse DATABASE_URL")
}

/// Create the schema if absent. Failure is logged and the process keeps serving.
pub async fn init_schema(db: &PgPool) {
    match sqlx::migrate!("./migrations").run(db).await {
        Ok(()) => tracing::info!("schema ready"),
        Err(e) => {
            tracing::warn!(error = %e, "schema initialization failed; continuing without guarantees")
        }
    }
}
