//! Admin console API. ADMIN and SUPERUSER only.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use stayhaven_common::validation::parse_dob;
use stayhaven_common::{ApiError, Role};
use stayhaven_db::{ModerationPatch, UserProfileUpdate};
use tracing::info;

use super::properties::parse_id;
use super::{hash_password, non_blank};
use crate::session::Staff;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    pub q: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PropertySearch {
    pub q: Option<String>,
    pub filter: Option<String>,
}

/// Editable profile fields. Anything else in the body (email, role, bank
/// details) is dropped during deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub dob: Option<String>,
    pub company_name: Option<String>,
    pub password: Option<String>,
}

/// GET /api/admin/overview
pub async fn overview(State(state): State<SharedState>, _staff: Staff) -> Result<impl IntoResponse, ApiError> {
    let stats = state.db.stats().await?;
    Ok(Json(json!({ "ok": true, "overview": stats })))
}

/// GET /api/admin/users?q&role
pub async fn list_users(
    State(state): State<SharedState>,
    _staff: Staff,
    Query(search): Query<UserSearch>,
) -> Result<impl IntoResponse, ApiError> {
    let role = match non_blank(search.role) {
        Some(raw) => Some(raw.parse::<Role>().map_err(|_| ApiError::bad_request("InvalidRole"))?),
        None => None,
    };
    let users = state
        .users
        .search(search.q.as_deref().unwrap_or_default(), role, state.config.listings.admin_users_limit)
        .await?;
    Ok(Json(json!({ "ok": true, "users": users })))
}

/// PATCH /api/admin/users/{id}
pub async fn update_user(
    State(state): State<SharedState>,
    Staff(staff): Staff,
    Path(id): Path<String>,
    Json(patch): Json<AdminUserPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let password_hash = match patch.password.filter(|p| !p.is_empty()) {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };
    let update = UserProfileUpdate {
        name: non_blank(patch.name),
        phone: non_blank(patch.phone),
        country: non_blank(patch.country),
        dob: patch.dob.as_deref().and_then(parse_dob),
        company_name: non_blank(patch.company_name),
        password_hash,
    };

    let user = state
        .users
        .update_profile(id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("NotFound".into()))?;
    info!("{} edited user {}", staff.email(), id);
    Ok(Json(json!({ "ok": true, "user": user })))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<SharedState>,
    Staff(staff): Staff,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let role = state
        .users
        .role_of(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NotFound".into()))?;
    if role.is_staff() {
        return Err(ApiError::Forbidden("CannotDeleteAdmin".into()));
    }
    state.users.delete(id).await?;
    info!("{} deleted user {}", staff.email(), id);
    Ok(Json(json!({ "ok": true })))
}

/// GET /api/admin/properties?q&filter
pub async fn list_properties(
    State(state): State<SharedState>,
    _staff: Staff,
    Query(search): Query<PropertySearch>,
) -> Result<impl IntoResponse, ApiError> {
    let featured_only = search.filter.as_deref() == Some("featured");
    let properties = state
        .properties
        .admin_search(
            search.q.as_deref().unwrap_or_default(),
            featured_only,
            state.config.listings.admin_properties_limit,
        )
        .await?;
    Ok(Json(json!({ "ok": true, "properties": properties })))
}

/// PATCH /api/admin/properties/{id} - featured / active / status toggles
pub async fn moderate_property(
    State(state): State<SharedState>,
    Staff(staff): Staff,
    Path(id): Path<String>,
    Json(patch): Json<ModerationPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let property = if patch.is_empty() {
        state.properties.find(id).await?
    } else {
        state.properties.moderate(id, &patch).await?
    };
    let property = property.ok_or_else(|| ApiError::NotFound("NotFound".into()))?;
    info!("{} moderated property {}: {:?}", staff.email(), id, patch);
    Ok(Json(json!({ "ok": true, "property": property })))
}

/// DELETE /api/admin/properties/{id}
pub async fn delete_property(
    State(state): State<SharedState>,
    Staff(staff): Staff,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    if !state.properties.delete(id).await? {
        return Err(ApiError::NotFound("NotFound".into()));
    }
    info!("{} deleted property {}", staff.email(), id);
    Ok(Json(json!({ "ok": true })))
}

/// GET /api/admin/reservations - bookings are not modelled yet
pub async fn reservations(_staff: Staff) -> impl IntoResponse {
    Json(json!({ "ok": true, "reservations": [] }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_fields_are_dropped() {
        let patch: AdminUserPatch = serde_json::from_value(json!({
            "name": "Renamed",
            "email": "hijack@example.com",
            "role": "SUPERUSER",
            "bankVerified": true,
            "companyName": "Coastline"
        }))
        .unwrap();
        assert_eq!(patch.name.as_deref(), Some("Renamed"));
        assert_eq!(patch.company_name.as_deref(), Some("Coastline"));
        assert!(patch.password.is_none());
    }
}
