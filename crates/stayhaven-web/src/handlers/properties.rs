//! Partner property management: list, create, read, update, delete.
//!
//! Listing forms post loosely typed JSON: numbers may arrive as strings,
//! images as bare URLs or `{url, alt, order}` objects. Coercion happens
//! here, before anything reaches the repository.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use stayhaven_common::facilities::{sanitize_amenities, sanitize_facilities};
use stayhaven_common::{ApiError, Role};
use stayhaven_db::{NewImage, Property, PropertyStatus, PropertyWrite};
use tracing::{info, warn};
use uuid::Uuid;

use crate::session::Session;
use crate::state::{AppState, SharedState};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageInput {
    Url(String),
    Object {
        #[serde(default)]
        url: String,
        alt: Option<String>,
        order: Option<Value>,
    },
}

impl ImageInput {
    pub fn url(&self) -> &str {
        match self {
            ImageInput::Url(url) | ImageInput::Object { url, .. } => url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub price: Option<Value>,
    pub rooms: Option<Value>,
    pub bathrooms: Option<Value>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
    pub thumbnail_index: Option<Value>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
}

// ── Coercion ─────────────────────────────────────────────────────────────────

/// Numbers sent as JSON numbers or numeric strings. Blank, zero, false and
/// unparsable values count as "not given".
pub fn given_number(value: &Option<Value>) -> Option<f64> {
    let n = match value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (n.is_finite() && n != 0.0).then_some(n)
}

fn given_int(value: &Option<Value>) -> Option<i32> {
    given_number(value).map(|n| n.round() as i32)
}

fn index_value(value: &Option<Value>) -> Option<usize> {
    match value.as_ref()? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `None` keeps the stored text; an explicit blank clears it.
fn merge_text(incoming: Option<String>, stored: &Option<String>) -> Option<String> {
    match incoming {
        None => stored.clone(),
        Some(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
    }
}

fn parse_status(raw: Option<&str>) -> Option<PropertyStatus> {
    raw.and_then(|s| s.parse().ok())
}

/// Image rows in submission order. `order` defaults to the position and the
/// thumbnail is whichever position `thumbnail_index` names.
pub fn build_images(images: &[ImageInput], thumbnail_index: Option<usize>) -> Vec<NewImage> {
    images
        .iter()
        .enumerate()
        .map(|(idx, img)| {
            let (alt, order) = match img {
                ImageInput::Url(_) => (None, None),
                ImageInput::Object { alt, order, .. } => (alt.clone(), order.as_ref().and_then(Value::as_i64)),
            };
            NewImage {
                url: img.url().to_string(),
                alt,
                sort_order: order.map(|o| o as i32).unwrap_or(idx as i32),
                is_thumb: thumbnail_index == Some(idx),
            }
        })
        .collect()
}

/// Apply an edit on top of the stored property.
pub fn merge_update(existing: &Property, payload: PropertyPayload) -> PropertyWrite {
    PropertyWrite {
        title: payload
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| existing.title.clone()),
        description: merge_text(payload.description, &existing.description),
        address: merge_text(payload.address, &existing.address),
        city: merge_text(payload.city, &existing.city),
        country: merge_text(payload.country, &existing.country),
        price: given_number(&payload.price).unwrap_or(existing.price),
        rooms: given_int(&payload.rooms).or(existing.rooms),
        bathrooms: given_int(&payload.bathrooms).or(existing.bathrooms),
        property_type: merge_text(payload.property_type, &existing.property_type),
        status: parse_status(payload.status.as_deref()).unwrap_or(existing.status),
        latitude: given_number(&payload.latitude),
        longitude: given_number(&payload.longitude),
        amenities: sanitize_amenities(&payload.amenities),
        facilities: sanitize_facilities(&payload.facilities),
        images: build_images(&payload.images, index_value(&payload.thumbnail_index)),
    }
}

/// A new listing; the title is mandatory.
pub fn build_create(payload: PropertyPayload) -> Result<PropertyWrite, ApiError> {
    let title = payload
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("MissingTitle"))?;

    Ok(PropertyWrite {
        title,
        description: merge_text(payload.description, &None),
        address: merge_text(payload.address, &None),
        city: merge_text(payload.city, &None),
        country: merge_text(payload.country, &None),
        price: given_number(&payload.price).unwrap_or(0.0),
        rooms: given_int(&payload.rooms),
        bathrooms: given_int(&payload.bathrooms),
        property_type: merge_text(payload.property_type, &None),
        status: parse_status(payload.status.as_deref()).unwrap_or_default(),
        latitude: given_number(&payload.latitude),
        longitude: given_number(&payload.longitude),
        amenities: sanitize_amenities(&payload.amenities),
        facilities: sanitize_facilities(&payload.facilities),
        images: build_images(&payload.images, index_value(&payload.thumbnail_index)),
    })
}

/// Lower-case, hyphen-separated title plus a short random suffix.
pub fn slug_for(title: &str) -> String {
    let mut base = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            base.push(c.to_ascii_lowercase());
        } else if !base.ends_with('-') && !base.is_empty() {
            base.push('-');
        }
    }
    let base = base.trim_end_matches('-');
    let base = if base.is_empty() { "property" } else { base };
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{base}-{}", &suffix[..8])
}

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("NotFound".into()))
}

fn ensure_owner(property: &Property, session: &Session) -> Result<(), ApiError> {
    if property.owner_id == session.user_id() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Forbidden".into()))
    }
}

/// Minimum count first, then every URL is fetched and measured.
async fn check_images(state: &AppState, urls: &[&str]) -> Result<(), ApiError> {
    let min = state.config.media.min_images;
    if urls.len() < min {
        return Err(ApiError::invalid(
            "ImagesMinimum",
            format!("At least {min} images are required."),
        ));
    }
    let problems = state.images.validate_all(urls).await;
    if !problems.is_empty() {
        warn!("{} of {} images failed validation", problems.len(), urls.len());
        return Err(ApiError::ImageValidation(problems));
    }
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/properties - the caller's own listings
pub async fn list_mine(
    State(state): State<SharedState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::Partner)?;
    let properties = state.properties.list_by_owner(session.user_id()).await?;
    Ok(Json(json!({ "ok": true, "properties": properties })))
}

/// POST /api/properties
pub async fn create(
    State(state): State<SharedState>,
    session: Session,
    Json(payload): Json<PropertyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::Partner)?;
    let write = build_create(payload)?;
    let urls: Vec<&str> = write.images.iter().map(|img| img.url.as_str()).collect();
    check_images(&state, &urls).await?;

    let mut slug = slug_for(&write.title);
    while state.properties.slug_exists(&slug).await? {
        slug = slug_for(&write.title);
    }

    let created = state.properties.create(session.user_id(), &slug, &write).await?;
    info!("Partner {} created property {}", session.user_id(), created.property.id);
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "property": created }))))
}

/// GET /api/properties/{id}
pub async fn get_one(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let property = state
        .properties
        .find_with_images(parse_id(&id)?)
        .await?
        .ok_or_else(|| ApiError::NotFound("NotFound".into()))?;
    Ok(Json(property))
}

/// PUT /api/properties/{id}
pub async fn update(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<PropertyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let existing = state
        .properties
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NotFound".into()))?;
    ensure_owner(&existing, &session)?;

    let urls: Vec<&str> = payload.images.iter().map(ImageInput::url).collect();
    check_images(&state, &urls).await?;
    let write = merge_update(&existing, payload);
    let updated = state
        .properties
        .update(id, &write)
        .await?
        .ok_or_else(|| ApiError::NotFound("NotFound".into()))?;

    info!("Property {} updated by {}", id, session.user_id());
    Ok(Json(json!({ "ok": true, "property": updated })))
}

/// DELETE /api/properties/{id}
pub async fn delete(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let existing = state
        .properties
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NotFound".into()))?;
    ensure_owner(&existing, &session)?;

    state.properties.delete(id).await?;
    info!("Property {} deleted by {}", id, session.user_id());
    Ok(Json(json!({ "ok": true })))
}
