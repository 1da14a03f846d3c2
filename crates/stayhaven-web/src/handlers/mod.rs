//! HTTP handlers for all web routes.

pub mod auth;
pub mod public;
pub mod properties;
pub mod dashboard;
pub mod finance;
pub mod admin;
pub mod pages;

use stayhaven_common::ApiError;

/// Hash on the blocking pool.
pub(crate) async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || stayhaven_security::hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

pub(crate) async fn verify_password(password: String, stored_hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || stayhaven_security::verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Treat `Some("")` and whitespace-only strings as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Nairobi ".into())), Some("Nairobi".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
