//! Axum router: maps all URL paths to handlers.

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{admin, auth, dashboard, finance, pages, properties, public};
use crate::middleware::edge_gate;
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",             get(pages::home))
        .route("/login",        get(pages::login_page).post(pages::login_submit))
        .route("/admin/login",  get(pages::admin_login_page))
        .route("/unauthorized", get(pages::unauthorized))
        .route("/dashboard",    get(pages::dashboard))
        .route("/admin",        get(pages::admin))
        .route("/super",        get(pages::superuser))

        // Auth
        .route("/api/auth/signup",          post(auth::signup))
        .route("/api/auth/login",           post(auth::login))
        .route("/api/auth/logout",          post(auth::logout))
        .route("/api/auth/session",         get(auth::session_profile))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password",  post(auth::reset_password))

        // Public listings
        .route("/api/public/properties",        get(public::list_properties))
        .route("/api/public/properties/{slug}", get(public::property_detail))
        .route("/api/public/listings",          get(public::search_listings))
        .route("/api/public/featured",          get(public::featured))
        .route("/api/facilities",               get(public::facilities))

        // Partner
        .route("/api/properties",      get(properties::list_mine).post(properties::create))
        .route("/api/properties/{id}", get(properties::get_one).put(properties::update).delete(properties::delete))
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/finance/bank",    post(finance::save_bank))

        // Admin
        .route("/api/admin/overview",         get(admin::overview))
        .route("/api/admin/users",            get(admin::list_users))
        .route("/api/admin/users/{id}",       patch(admin::update_user).delete(admin::delete_user))
        .route("/api/admin/properties",       get(admin::list_properties))
        .route("/api/admin/properties/{id}",  patch(admin::moderate_property).delete(admin::delete_property))
        .route("/api/admin/reservations",     get(admin::reservations))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(middleware::from_fn_with_state(shared.clone(), edge_gate))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
