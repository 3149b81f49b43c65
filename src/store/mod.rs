//! Ledger store: PostgreSQL connection management and repositories.
//!
//! Repositories issue raw `sqlx::query` with binds. Reads take the pool;
//! mutations take `&mut PgConnection` so the lifecycle service can compose
//! them inside one transaction.

pub mod logs;
pub mod notifications;
pub mod requests;
pub mod schema;
pub mod slips;
pub mod transactions;
pub mod users;

pub use logs::LogStore;
pub use notifications::NotificationStore;
pub use requests::RequestStore;
pub use slips::SlipStore;
pub use transactions::TransactionStore;
pub use users::UserStore;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map an invalid persisted enum code to a decode error.
///
/// Codes are written by this application only; hitting this path means the
/// row was tampered with or the schema drifted.
pub(crate) fn bad_code(column: &str, id: i16) -> sqlx::Error {
    sqlx::Error::Decode(format!("invalid {} code: {}", column, id).into())
}
