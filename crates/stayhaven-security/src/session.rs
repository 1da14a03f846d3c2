//! Signed session tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use stayhaven_common::Role;
use uuid::Uuid;

use crate::{Result, SecurityError};

/// What a session token asserts about its bearer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// HMAC keys plus the session lifetime.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a freshly authenticated user.
    pub fn issue(&self, user_id: Uuid, email: &str, name: Option<&str>, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_string(),
            name: name.map(str::to_string),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verify signature and expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SecurityError::Expired,
                _ => SecurityError::Token(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"a-test-secret-of-decent-length", Duration::hours(1))
    }

    #[test]
    fn test_issue_then_verify() {
        let id = Uuid::new_v4();
        let token = keys().issue(id, "host@example.com", Some("Host"), Role::Partner).unwrap();
        let claims = keys().verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Partner);
        assert_eq!(claims.name.as_deref(), Some("Host"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            email: "old@example.com".into(),
            name: None,
            role: Role::Admin,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = keys().encode(&claims).unwrap();
        assert!(matches!(keys().verify(&token), Err(SecurityError::Expired)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = keys().issue(Uuid::new_v4(), "a@b.co", None, Role::Superuser).unwrap();
        let other = SessionKeys::new(b"another-secret-entirely-here", Duration::hours(1));
        assert!(matches!(other.verify(&token), Err(SecurityError::Token(_))));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = keys().issue(Uuid::new_v4(), "a@b.co", None, Role::Partner).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "AAAA";
        assert!(keys().verify(&parts.join(".")).is_err());
    }
}
