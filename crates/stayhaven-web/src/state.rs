//! Shared application state for the web server.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::Duration;
use secrecy::ExposeSecret;
use stayhaven_config::Config;
use stayhaven_db::{Database, PropertyRepository, UserRepository, VerificationTokenRepository};
use stayhaven_media::ImageValidator;
use stayhaven_security::{SessionClaims, SessionKeys};

use crate::pages::Pages;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub db: Database,
    pub users: UserRepository,
    pub properties: PropertyRepository,
    pub tokens: VerificationTokenRepository,
    pub config: Arc<Config>,
    pub images: ImageValidator,
    pub sessions: SessionKeys,
    pub pages: Pages,
}

impl AppState {
    pub fn new(db: Database, config: Config, images: ImageValidator) -> anyhow::Result<Self> {
        let sessions = SessionKeys::new(
            config.session.secret.expose_secret().as_bytes(),
            Duration::hours(config.session.ttl_hours),
        );
        Ok(Self {
            users: UserRepository::new(&db),
            properties: PropertyRepository::new(&db),
            tokens: VerificationTokenRepository::new(&db),
            db,
            config: Arc::new(config),
            images,
            sessions,
            pages: Pages::new()?,
        })
    }

    /// Verified claims from the session cookie, or from a bearer token when
    /// no cookie is present.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<SessionClaims> {
        let jar = CookieJar::from_headers(headers);
        let token = match jar.get(&self.config.session.cookie_name) {
            Some(cookie) => cookie.value().to_string(),
            None => headers.typed_get::<Authorization<Bearer>>()?.token().to_string(),
        };
        match self.sessions.verify(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                None
            }
        }
    }
}

pub type SharedState = Arc<AppState>;
