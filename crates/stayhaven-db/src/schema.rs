//! Table definitions and row types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stayhaven_common::Role;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DbError;

/// Idempotent DDL applied at startup, in order.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name                TEXT,
        email               TEXT NOT NULL UNIQUE,
        password_hash       TEXT,
        role                TEXT NOT NULL DEFAULT 'PARTNER'
                            CHECK (role IN ('PARTNER', 'ADMIN', 'SUPERUSER')),
        phone               TEXT,
        country             TEXT,
        dob                 DATE,
        company_name        TEXT,
        email_verified      BOOLEAN NOT NULL DEFAULT FALSE,
        bank_name           TEXT,
        bank_branch_code    TEXT,
        bank_account_number TEXT,
        bank_account_name   TEXT,
        bank_currency       TEXT,
        bank_verified       BOOLEAN NOT NULL DEFAULT FALSE,
        created_at          TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at          TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS properties (
        id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        owner_id      UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title         TEXT NOT NULL,
        slug          TEXT UNIQUE,
        description   TEXT,
        address       TEXT,
        city          TEXT,
        country       TEXT,
        price         DOUBLE PRECISION NOT NULL DEFAULT 0,
        rooms         INTEGER,
        bathrooms     INTEGER,
        property_type TEXT,
        status        TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published')),
        featured      BOOLEAN NOT NULL DEFAULT FALSE,
        active        BOOLEAN NOT NULL DEFAULT TRUE,
        latitude      DOUBLE PRECISION,
        longitude     DOUBLE PRECISION,
        amenities     TEXT[] NOT NULL DEFAULT '{}',
        facilities    TEXT[] NOT NULL DEFAULT '{}',
        rating        DOUBLE PRECISION,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS properties_owner_idx ON properties (owner_id)",
    "CREATE INDEX IF NOT EXISTS properties_public_idx ON properties (status, active, updated_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS property_images (
        id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        property_id UUID NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
        url         TEXT NOT NULL,
        alt         TEXT,
        sort_order  INTEGER NOT NULL DEFAULT 0,
        is_thumb    BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS property_images_property_idx ON property_images (property_id, sort_order)",
    r#"
    CREATE TABLE IF NOT EXISTS verification_tokens (
        identifier TEXT NOT NULL,
        token_hash TEXT NOT NULL,
        expires    TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (identifier, token_hash)
    )
    "#,
];

// ── Users ────────────────────────────────────────────────────────────────────

/// Full user row. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub dob: Option<NaiveDate>,
    pub company_name: Option<String>,
    pub email_verified: bool,
    pub bank_name: Option<String>,
    pub bank_branch_code: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_name: Option<String>,
    pub bank_currency: Option<String>,
    pub bank_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns shown in the admin user table (no credentials, no bank data).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub dob: Option<NaiveDate>,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const USER_SUMMARY_COLUMNS: &str =
    "id, name, email, role, phone, country, dob, company_name, created_at, updated_at";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub bank_name: Option<String>,
    pub bank_branch_code: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_name: Option<String>,
    pub bank_currency: Option<String>,
    pub bank_verified: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub dob: Option<NaiveDate>,
    pub company_name: Option<String>,
}

/// Fields an admin may change on someone else's account. `None` leaves a column as is.
#[derive(Debug, Clone, Default)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub dob: Option<NaiveDate>,
    pub company_name: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BankUpdate {
    pub bank_name: String,
    pub bank_branch_code: Option<String>,
    pub bank_account_number: String,
    pub bank_account_name: String,
    pub bank_currency: Option<String>,
}

// ── Properties ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Draft,
    Published,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Draft => "draft",
            PropertyStatus::Published => "published",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PropertyStatus::Draft),
            "published" => Ok(PropertyStatus::Published),
            other => Err(DbError::InvalidValue(format!("property status '{other}'"))),
        }
    }
}

impl TryFrom<String> for PropertyStatus {
    type Error = DbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub price: f64,
    pub rooms: Option<i32>,
    pub bathrooms: Option<i32>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: PropertyStatus,
    pub featured: bool,
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub amenities: Vec<String>,
    pub facilities: Vec<String>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// "address, city, country" with blank parts skipped.
    pub fn location(&self) -> String {
        [&self.address, &self.city, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Public path segment: the slug, or the id when no slug was assigned.
    pub fn public_slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub url: String,
    pub alt: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub is_thumb: bool,
}

/// A property with its images in display order, and optionally its owner.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyWithImages {
    #[serde(flatten)]
    pub property: Property,
    pub images: Vec<PropertyImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,
}

impl PropertyWithImages {
    /// Image URLs with the thumbnail first, then the rest in stored order.
    pub fn urls_thumbnail_first(&self) -> Vec<String> {
        let mut images: Vec<&PropertyImage> = self.images.iter().collect();
        // stable sort keeps sort_order within each group
        images.sort_by_key(|img| (!img.is_thumb, img.sort_order));
        images.into_iter().map(|img| img.url.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub url: String,
    pub alt: Option<String>,
    pub sort_order: i32,
    pub is_thumb: bool,
}

/// Fully resolved column values for an insert or a full update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyWrite {
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub price: f64,
    pub rooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub property_type: Option<String>,
    pub status: PropertyStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub amenities: Vec<String>,
    pub facilities: Vec<String>,
    pub images: Vec<NewImage>,
}

/// Admin moderation toggles. `None` leaves a column as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModerationPatch {
    pub featured: Option<bool>,
    pub active: Option<bool>,
    pub status: Option<PropertyStatus>,
}

impl ModerationPatch {
    pub fn is_empty(&self) -> bool {
        self.featured.is_none() && self.active.is_none() && self.status.is_none()
    }
}

// ── Verification tokens ──────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VerificationToken {
    pub identifier: String,
    pub token_hash: String,
    pub expires: DateTime<Utc>,
}

impl VerificationToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires < now
    }
}

/// Escape LIKE metacharacters and wrap for a contains match.
pub fn contains_pattern(q: &str) -> String {
    let escaped = q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn property() -> Property {
        Property {
            id: Uuid::nil(),
            owner_id: Uuid::nil(),
            title: "Ocean Villa".into(),
            slug: None,
            description: None,
            address: Some("12 Beach Rd".into()),
            city: Some("  ".into()),
            country: Some("Kenya".into()),
            price: 120.0,
            rooms: Some(3),
            bathrooms: None,
            property_type: None,
            status: PropertyStatus::Published,
            featured: false,
            active: true,
            latitude: None,
            longitude: None,
            amenities: vec![],
            facilities: vec![],
            rating: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn image(url: &str, order: i32, thumb: bool) -> PropertyImage {
        PropertyImage {
            id: Uuid::new_v4(),
            property_id: Uuid::nil(),
            url: url.into(),
            alt: None,
            sort_order: order,
            is_thumb: thumb,
        }
    }

    #[test]
    fn test_location_skips_blank_parts() {
        assert_eq!(property().location(), "12 Beach Rd, Kenya");
    }

    #[test]
    fn test_public_slug_falls_back_to_id() {
        let mut p = property();
        assert_eq!(p.public_slug(), Uuid::nil().to_string());
        p.slug = Some("ocean-villa".into());
        assert_eq!(p.public_slug(), "ocean-villa");
    }

    #[test]
    fn test_thumbnail_first_then_order() {
        let p = PropertyWithImages {
            property: property(),
            images: vec![image("a", 0, false), image("c", 2, true), image("b", 1, false)],
            owner: None,
        };
        assert_eq!(p.urls_thumbnail_first(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Published".parse::<PropertyStatus>().unwrap(), PropertyStatus::Published);
        assert!("archived".parse::<PropertyStatus>().is_err());
    }

    #[test]
    fn test_contains_pattern_escapes() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_property_serializes_camel_case() {
        let json = serde_json::to_value(property()).unwrap();
        assert_eq!(json["ownerId"], Uuid::nil().to_string());
        assert_eq!(json["status"], "published");
        assert!(json.get("type").is_some());
    }
}
