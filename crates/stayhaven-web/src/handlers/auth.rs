//! Credentials auth: signup, login/logout, session profile and password reset.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use stayhaven_common::validation::{is_strong_password, is_valid_email, normalize_email, parse_dob, PhoneInput};
use stayhaven_common::{ApiError, Role};
use stayhaven_db::{DbError, NewUser, User};
use stayhaven_security::ResetToken;
use tracing::info;
use url::form_urlencoded::byte_serialize;

use super::{hash_password, non_blank, verify_password};
use crate::session::{cleared_cookie, session_cookie, Session};
use crate::state::{AppState, SharedState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<PhoneInput>,
    pub country: Option<String>,
    pub dob: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub token: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<SharedState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = non_blank(req.email).map(|e| normalize_email(&e));
    let (Some(email), Some(password)) = (email, req.password.filter(|p| !p.is_empty())) else {
        return Err(ApiError::bad_request("MissingFields"));
    };
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("InvalidEmail"));
    }
    if !is_strong_password(&password) {
        return Err(ApiError::bad_request("WeakPassword"));
    }
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("EmailExists".into()));
    }

    let new_user = NewUser {
        name: non_blank(req.name),
        email,
        password_hash: Some(hash_password(password).await?),
        role: Some(Role::Partner),
        phone: req.phone.as_ref().and_then(PhoneInput::compose),
        country: non_blank(req.country),
        dob: req.dob.as_deref().and_then(parse_dob),
        company_name: non_blank(req.company_name),
    };

    let user = match state.users.create(&new_user).await {
        Ok(user) => user,
        Err(DbError::Duplicate(_)) => return Err(ApiError::Conflict("EmailExists".into())),
        Err(e) => return Err(e.into()),
    };
    info!("New partner account {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "user": { "id": user.id, "email": user.email } })),
    ))
}

/// Check credentials and return the matching user.
pub async fn authenticate(state: &AppState, email: Option<&str>, password: Option<&str>) -> Result<User, ApiError> {
    let email = email.map(normalize_email).filter(|e| !e.is_empty());
    let (Some(email), Some(password)) = (email, password.filter(|p| !p.is_empty())) else {
        return Err(ApiError::bad_request("InvalidCredentials"));
    };

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("UserNotFound".into()))?;
    let stored = user
        .password_hash
        .clone()
        .ok_or_else(|| ApiError::Unauthenticated("NoPasswordSet".into()))?;

    if !verify_password(password.to_string(), stored).await? {
        return Err(ApiError::Unauthenticated("InvalidCredentials".into()));
    }
    Ok(user)
}

/// Sign a session token for `user` and wrap it in the session cookie.
pub fn start_session(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar, ApiError> {
    let token = state
        .sessions
        .issue(user.id, &user.email, user.name.as_deref(), user.role)?;
    Ok(jar.add(session_cookie(&state.config.session, token)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = authenticate(&state, req.email.as_deref(), req.password.as_deref()).await?;
    let jar = start_session(&state, jar, &user)?;
    info!("{} signed in as {}", user.id, user.role);
    Ok((
        jar,
        Json(json!({
            "ok": true,
            "user": { "id": user.id, "email": user.email, "name": user.name, "role": user.role },
        })),
    ))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<SharedState>, jar: CookieJar) -> impl IntoResponse {
    (jar.remove(cleared_cookie(&state.config.session)), Json(json!({ "ok": true })))
}

/// GET /api/auth/session - the signed-in user's profile
pub async fn session_profile(
    State(state): State<SharedState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_by_id(session.user_id())
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Unauthenticated".into()))?;
    Ok(Json(json!({ "ok": true, "user": user })))
}

pub fn reset_url(base: &str, token: &str, email: &str) -> String {
    let token: String = byte_serialize(token.as_bytes()).collect();
    let email: String = byte_serialize(email.as_bytes()).collect();
    format!("{base}/reset-password?token={token}&email={email}")
}

/// POST /api/auth/forgot-password
///
/// Reset links are returned in the response; nothing is mailed.
pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if email.is_empty() {
        return Err(ApiError::bad_request("MissingEmail"));
    }

    if state.users.find_by_email(&email).await?.is_none() {
        return Ok(Json(json!({
            "ok": true,
            "message": "If an account exists, a reset email will be sent.",
        })));
    }

    let token = ResetToken::generate(Duration::minutes(state.config.auth.reset_token_ttl_minutes));
    state.tokens.replace(&email, &token.digest, token.expires).await?;
    info!("Issued password reset token expiring at {}", token.expires);

    let reset_url = reset_url(state.config.public_base_url(), &token.raw, &email);
    Ok(Json(json!({ "ok": true, "resetUrl": reset_url })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    let token = req.token.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    if email.is_empty() || token.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("MissingFields"));
    }

    let record = state
        .tokens
        .find(&email, &ResetToken::digest(&token))
        .await?
        .ok_or_else(|| ApiError::bad_request("InvalidOrExpiredToken"))?;
    if record.is_expired(Utc::now()) {
        state.tokens.delete_for(&email).await?;
        return Err(ApiError::bad_request("InvalidOrExpiredToken"));
    }

    if state.users.find_by_email(&email).await?.is_none() {
        return Err(ApiError::NotFound("UserNotFound".into()));
    }

    let hash = hash_password(password).await?;
    state.users.set_password(&email, &hash).await?;
    state.tokens.delete_for(&email).await?;
    info!("Password reset completed");

    Ok(Json(json!({ "ok": true })))
}
