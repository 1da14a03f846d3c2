//! Connection pool and schema management.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::error::Result;
use crate::schema;

/// Main database handle.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self { max_connections: 10, min_connections: 2 }
    }
}

/// Row counts shown on the admin overview.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub users: i64,
    pub properties: i64,
    pub featured_properties: i64,
}

impl Database {
    /// Connect and verify the server is reachable.
    pub async fn connect(url: &str, options: PoolOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;
        tracing::info!(max = options.max_connections, "connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Build a pool that connects on first use. Handy for tests that never
    /// reach the database.
    pub fn connect_lazy(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(1).connect_lazy(url)?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create all tables and indexes if they don't exist.
    pub async fn initialize(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for statement in schema::SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        tracing::info!(statements = schema::SCHEMA.len(), "database schema ready");
        Ok(())
    }

    pub async fn stats(&self) -> Result<DatabaseStats> {
        let (users, properties, featured_properties): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM properties),
                (SELECT COUNT(*) FROM properties WHERE featured)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(DatabaseStats { users, properties, featured_properties })
    }
}
