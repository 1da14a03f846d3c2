//! stayhaven-security: credentials, sessions, and reset tokens.
//!
//!   - Argon2id password hashing
//!   - HS256 session tokens carrying the user's id and role
//!   - Single-use password reset tokens stored as SHA-256 digests

pub mod password;
pub mod session;
pub mod reset;

use stayhaven_common::ApiError;
use thiserror::Error;

pub use password::{hash_password, verify_password};
pub use reset::ResetToken;
pub use session::{SessionClaims, SessionKeys};

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Session token has expired")]
    Expired,
}

pub type Result<T> = std::result::Result<T, SecurityError>;

impl From<SecurityError> for ApiError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::Hash(msg) => ApiError::Internal(msg),
            SecurityError::Token(_) | SecurityError::Expired => ApiError::Unauthenticated("Unauthenticated".into()),
        }
    }
}
