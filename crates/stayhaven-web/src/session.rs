//! Session extractor and role checks used by the JSON API.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite};
use stayhaven_common::{ApiError, Role};
use stayhaven_config::SessionConfig;
use stayhaven_security::SessionClaims;
use uuid::Uuid;

use crate::state::SharedState;

/// The authenticated caller. Rejects with 401 `Unauthenticated`.
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.0.sub
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Exact role match; other roles get 403 `Forbidden`.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.0.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Forbidden".into()))
        }
    }

    /// ADMIN or SUPERUSER; anyone else gets 401 `Unauthorized`.
    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.0.role.is_staff() {
            Ok(())
        } else {
            Err(ApiError::Unauthenticated("Unauthorized".into()))
        }
    }
}

impl FromRequestParts<SharedState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        state
            .session_from_headers(&parts.headers)
            .map(Session)
            .ok_or_else(|| ApiError::Unauthenticated("Unauthenticated".into()))
    }
}

/// Staff-only extractor for the admin API.
#[derive(Debug, Clone)]
pub struct Staff(pub Session);

impl FromRequestParts<SharedState> for Staff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let session = state
            .session_from_headers(&parts.headers)
            .map(Session)
            .ok_or_else(|| ApiError::Unauthenticated("Unauthorized".into()))?;
        session.require_staff()?;
        Ok(Staff(session))
    }
}

pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .build()
}

/// A cookie matching the session cookie's name and path, for removal.
pub fn cleared_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), "")).path("/").build()
}
