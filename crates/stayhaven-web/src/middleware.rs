//! Edge gate for the role-owned page prefixes.
//!
//! `/dashboard` belongs to partners, `/admin` to admins and `/super` to the
//! superuser. Anonymous visitors are sent to the login page with a
//! `callbackUrl`; signed-in users holding another role land on
//! `/unauthorized`. JSON endpoints under `/api` do their own checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use stayhaven_common::role::gate_for_path;
use tracing::debug;
use url::form_urlencoded::byte_serialize;

use crate::state::SharedState;

fn is_asset(path: &str) -> bool {
    path.starts_with("/static") || path.starts_with("/favicon.ico")
}

pub fn login_redirect_target(path: &str) -> String {
    let encoded: String = byte_serialize(path.as_bytes()).collect();
    format!("/login?callbackUrl={encoded}")
}

pub async fn edge_gate(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if is_asset(&path) {
        return next.run(req).await;
    }
    let Some(required) = gate_for_path(&path) else {
        return next.run(req).await;
    };

    match state.session_from_headers(req.headers()) {
        None => {
            debug!("No session for {}, redirecting to login", path);
            Redirect::to(&login_redirect_target(&path)).into_response()
        }
        Some(claims) if claims.role != required => {
            debug!("{} may not open {}", claims.role, path);
            Redirect::to("/unauthorized").into_response()
        }
        Some(_) => next.run(req).await,
    }
}
