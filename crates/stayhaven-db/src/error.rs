//! Database error types.

use stayhaven_common::ApiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("PostgreSQL error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let what = db_err.constraint().unwrap_or("unique constraint").to_string();
                return DbError::Duplicate(what);
            }
        }
        match err {
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::InvalidValue(format!("column {index}: {source}"))
            }
            other => DbError::Sqlx(other),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) => ApiError::NotFound("NotFound".into()),
            DbError::Duplicate(what) => ApiError::Conflict(format!("Duplicate:{what}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
