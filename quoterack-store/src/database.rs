use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use quoterack_core::CatalogRepository;

use crate::config::DatabaseConfig;
use crate::postgres::PgCatalog;
use crate::sqlite::SqliteCatalog;

/// Which concrete store a connection URL names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }
}

/// Builds the pool for whichever backend the URL names, ensures the
/// schema exists, and hands back the repository. The backend choice is
/// made exactly once, here.
pub async fn connect(cfg: &DatabaseConfig) -> Result<Arc<dyn CatalogRepository>, sqlx::Error> {
    match Backend::from_url(&cfg.url) {
        Some(Backend::Postgres) => {
            let pool = PgPoolOptions::new()
                .max_connections(cfg.max_connections)
                .acquire_timeout(Duration::from_secs(3))
                .connect(&cfg.url)
                .await?;
            let repo = PgCatalog::new(pool);
            repo.init_schema().await?;
            info!("connected to hosted PostgreSQL catalog store");
            Ok(Arc::new(repo))
        }
        Some(Backend::Sqlite) => {
            let opts = SqliteConnectOptions::from_str(&cfg.url)?
                .create_if_missing(true)
                .foreign_keys(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(cfg.max_connections)
                .acquire_timeout(Duration::from_secs(3))
                .connect_with(opts)
                .await?;
            let repo = SqliteCatalog::new(pool);
            repo.init_schema().await?;
            info!("connected to embedded SQLite catalog store");
            Ok(Arc::new(repo))
        }
        None => Err(sqlx::Error::Configuration(
            format!("unsupported database url: {}", cfg.url).into(),
        )),
    }
}
