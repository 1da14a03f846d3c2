//! Password-reset token storage.
//!
//! Only a digest of each token is stored; the raw value exists in the reset
//! link alone.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::Database;
use crate::error::Result;
use crate::schema::VerificationToken;

#[derive(Clone)]
pub struct VerificationTokenRepository {
    pool: PgPool,
}

impl VerificationTokenRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    /// Drop every outstanding token for `identifier` and store a new one.
    pub async fn replace(&self, identifier: &str, token_hash: &str, expires: DateTime<Utc>) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM verification_tokens WHERE identifier = $1")
            .bind(identifier)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO verification_tokens (identifier, token_hash, expires) VALUES ($1, $2, $3)")
            .bind(identifier)
            .bind(token_hash)
            .bind(expires)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn find(&self, identifier: &str, token_hash: &str) -> Result<Option<VerificationToken>> {
        let token = sqlx::query_as::<_, VerificationToken>(
            "SELECT identifier, token_hash, expires FROM verification_tokens WHERE identifier = $1 AND token_hash = $2",
        )
        .bind(identifier)
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    pub async fn delete_for(&self, identifier: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM verification_tokens WHERE identifier = $1")
            .bind(identifier)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
