//! HTML page handlers. Role checks for `/dashboard`, `/admin` and `/super`
//! happen in the edge gate before these run.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::Deserialize;
use stayhaven_common::ApiError;
use tracing::{debug, info};

use super::auth::{authenticate, start_session};
use super::dashboard::compute_stats;
use super::public::to_card;
use crate::session::Session;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    pub callback_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub callback_url: Option<String>,
}

/// Only same-site absolute paths are honoured as a post-login destination.
pub fn safe_callback(raw: Option<&str>) -> Option<&str> {
    raw.filter(|url| url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\"))
}

/// GET /
pub async fn home(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let listings = &state.config.listings;
    let properties: Vec<_> = state
        .properties
        .featured(listings.featured_limit)
        .await?
        .iter()
        .map(|p| to_card(p, listings))
        .collect();
    state.pages.render("home.html", context! { properties })
}

/// GET /login
pub async fn login_page(
    State(state): State<SharedState>,
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, ApiError> {
    state.pages.render(
        "login.html",
        context! { callback_url => query.callback_url, error => query.error },
    )
}

/// GET /admin/login - the same form, returning to the admin console
pub async fn admin_login_page(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    state
        .pages
        .render("login.html", context! { callback_url => "/admin", error => None::<String> })
}

/// POST /login
pub async fn login_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let user = match authenticate(&state, form.email.as_deref(), form.password.as_deref()).await {
        Ok(user) => user,
        Err(err @ (ApiError::BadRequest(_) | ApiError::Unauthenticated(_))) => {
            debug!("Login form rejected: {}", err);
            let code = err.body()["error"].as_str().unwrap_or("InvalidCredentials").to_string();
            let page = state.pages.render(
                "login.html",
                context! { callback_url => form.callback_url, error => code },
            )?;
            return Ok((err.status(), page).into_response());
        }
        Err(err) => return Err(err),
    };

    let jar = start_session(&state, jar, &user)?;
    let target = safe_callback(form.callback_url.as_deref())
        .unwrap_or(user.role.home_prefix())
        .to_string();
    info!("{} signed in via form, continuing to {}", user.id, target);
    Ok((jar, Redirect::to(&target)).into_response())
}

/// GET /unauthorized
pub async fn unauthorized(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    state.pages.render("unauthorized.html", context! {})
}

/// GET /dashboard
pub async fn dashboard(State(state): State<SharedState>, session: Session) -> Result<Html<String>, ApiError> {
    let owned = state.properties.list_by_owner(session.user_id()).await?;
    let stats = compute_stats(&owned);
    let properties: Vec<_> = owned
        .iter()
        .map(|item| {
            let p = &item.property;
            context! { title => p.title, location => p.location(), status => p.status, price => p.price }
        })
        .collect();
    state.pages.render(
        "dashboard.html",
        context! { name => session.0.name, email => session.email(), stats, properties },
    )
}

/// GET /admin
pub async fn admin(State(state): State<SharedState>, session: Session) -> Result<Html<String>, ApiError> {
    let overview = state.db.stats().await?;
    state.pages.render("admin.html", context! { email => session.email(), overview })
}

/// GET /super
pub async fn superuser(State(state): State<SharedState>, session: Session) -> Result<Html<String>, ApiError> {
    state
        .pages
        .render("super.html", context! { email => session.email(), role => session.role() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_callback() {
        assert_eq!(safe_callback(Some("/admin/users")), Some("/admin/users"));
        assert_eq!(safe_callback(Some("//evil.example")), None);
        assert_eq!(safe_callback(Some("https://evil.example")), None);
        assert_eq!(safe_callback(Some("/\\evil.example")), None);
        assert_eq!(safe_callback(None), None);
    }

    #[test]
    fn test_login_form_field_names() {
        let form: LoginForm =
            form_from("email=a%40b.io&password=pw&callbackUrl=%2Fdashboard");
        assert_eq!(form.email.as_deref(), Some("a@b.io"));
        assert_eq!(form.callback_url.as_deref(), Some("/dashboard"));
    }

    fn form_from(body: &str) -> LoginForm {
        let pairs: serde_json::Map<String, serde_json::Value> = url::form_urlencoded::parse(body.as_bytes())
            .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(pairs)).unwrap()
    }
}
