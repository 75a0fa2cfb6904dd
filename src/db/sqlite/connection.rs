//! SQLite pool and migration management.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tracing::info;

use super::{
    CategoryRepository, CustomerRepository, ExchangeRateRepository, ProductRepository,
    SaleRepository, StoreRepository, SubcategoryRepository,
};
use crate::db::{DbError, DbResult};

// Embed migrations from migrations/sqlite/ at compile time
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("migrations/sqlite");

/// SQLite database handle.
///
/// Owns the connection pool; repositories borrow it per call, so every
/// request acquires a pooled connection and releases it when the query
/// future completes.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (or create) a database file at the given path.
    ///
    /// WAL journal mode for concurrent reads, foreign keys ON (SQLite
    /// disables them by default), NORMAL synchronous.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let url = format!("sqlite://{}?mode=rwc", path.as_ref().display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        info!(path = %path.as_ref().display(), "database pool created");
        Ok(Self { pool })
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// A single connection only: each in-memory connection is its own
    /// database, so a larger pool would fragment the data.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Run pending migrations. Idempotent.
    pub async fn migrate(&self) -> DbResult<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Liveness probe: can the database execute a query?
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Direct pool access for queries not covered by the repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn customers(&self) -> CustomerRepository<'_> {
        CustomerRepository { pool: &self.pool }
    }

    pub fn categories(&self) -> CategoryRepository<'_> {
        CategoryRepository { pool: &self.pool }
    }

    pub fn subcategories(&self) -> SubcategoryRepository<'_> {
        SubcategoryRepository { pool: &self.pool }
    }

    pub fn products(&self) -> ProductRepository<'_> {
        ProductRepository { pool: &self.pool }
    }

    pub fn stores(&self) -> StoreRepository<'_> {
        StoreRepository { pool: &self.pool }
    }

    pub fn sales(&self) -> SaleRepository<'_> {
        SaleRepository { pool: &self.pool }
    }

    pub fn exchange_rates(&self) -> ExchangeRateRepository<'_> {
        ExchangeRateRepository { pool: &self.pool }
    }
}
