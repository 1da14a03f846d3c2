//! Public, unauthenticated listing endpoints.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use stayhaven_common::facilities::FACILITY_GROUPS;
use stayhaven_common::images::{cdn_transform, DEFAULT_CDN_TRANSFORM};
use stayhaven_common::rating::{bucket_starting_at, label_for};
use stayhaven_common::ApiError;
use stayhaven_config::ListingsConfig;
use stayhaven_db::{ListingQuery, ListingSort, PropertyWithImages};

use crate::state::SharedState;

/// The card shape the listing pages render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicCard {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub location: String,
    pub price_per_night: f64,
    pub currency: String,
    pub rating: f64,
    pub rating_label: Option<&'static str>,
    pub images: Vec<String>,
    /// First image resized by the CDN for card grids.
    pub thumbnail: Option<String>,
    pub description: String,
    pub amenities: Vec<String>,
    pub rooms: Option<i32>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDetail {
    #[serde(flatten)]
    pub card: PublicCard,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub bathrooms: Option<i32>,
    pub facilities: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub fn to_card(item: &PropertyWithImages, listings: &ListingsConfig) -> PublicCard {
    let p = &item.property;
    let rating = p.rating.unwrap_or(listings.default_rating);
    let images = item.urls_thumbnail_first();
    PublicCard {
        id: p.id.to_string(),
        slug: p.public_slug(),
        title: p.title.clone(),
        location: p.location(),
        price_per_night: p.price,
        currency: listings.currency.clone(),
        rating,
        rating_label: label_for(rating),
        thumbnail: images.first().map(|url| cdn_transform(url, DEFAULT_CDN_TRANSFORM)),
        images,
        description: p.description.clone().unwrap_or_default(),
        amenities: p.amenities.clone(),
        rooms: p.rooms,
        property_type: p.property_type.clone(),
    }
}

pub fn to_detail(item: &PropertyWithImages, listings: &ListingsConfig) -> PublicDetail {
    let p = &item.property;
    PublicDetail {
        card: to_card(item, listings),
        address: p.address.clone(),
        city: p.city.clone(),
        country: p.country.clone(),
        bathrooms: p.bathrooms,
        facilities: p.facilities.clone(),
        latitude: p.latitude,
        longitude: p.longitude,
    }
}

/// Raw search parameters. Everything arrives as text and unparsable values
/// are ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub q: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub rooms: Option<String>,
    pub amenities: Option<String>,
    /// Lower bound of one of the rating buckets, e.g. `8`.
    pub min_rating: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

fn text(v: &Option<String>) -> Option<String> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn number<T: std::str::FromStr>(v: &Option<String>) -> Option<T> {
    v.as_deref().and_then(|s| s.trim().parse().ok())
}

impl ListingParams {
    /// Page number (1-based) and page size after defaults and clamping.
    /// The page is capped so the row offset always fits in an `i64`.
    pub fn paging(&self, listings: &ListingsConfig) -> (i64, i64) {
        let last_page = i64::MAX / listings.max_per_page.max(1);
        let page = number::<i64>(&self.page).unwrap_or(1).clamp(1, last_page);
        let per_page = number::<i64>(&self.per_page)
            .unwrap_or(listings.per_page)
            .clamp(1, listings.max_per_page);
        (page, per_page)
    }

    pub fn to_query(&self, listings: &ListingsConfig) -> ListingQuery {
        let (page, per_page) = self.paging(listings);
        ListingQuery {
            q: text(&self.q),
            city: text(&self.city),
            country: text(&self.country),
            min_price: number(&self.min_price),
            max_price: number(&self.max_price),
            rooms: number(&self.rooms),
            amenities: self
                .amenities
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            min_rating: number::<f64>(&self.min_rating)
                .and_then(bucket_starting_at)
                .map(|bucket| bucket.min),
            default_rating: listings.default_rating,
            sort: self.sort.as_deref().map(ListingSort::parse).unwrap_or_default(),
            offset: (page - 1) * per_page,
            limit: per_page,
        }
    }
}

/// GET /api/public/properties - every published property as a card
pub async fn list_properties(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let listings = &state.config.listings;
    let cards: Vec<PublicCard> = state
        .properties
        .list_published()
        .await?
        .iter()
        .map(|p| to_card(p, listings))
        .collect();
    Ok(Json(cards))
}

/// GET /api/public/listings - filtered, sorted, paged search
pub async fn search_listings(
    State(state): State<SharedState>,
    Query(params): Query<ListingParams>,
) -> Result<impl IntoResponse, ApiError> {
    let listings = &state.config.listings;
    let (page, per_page) = params.paging(listings);
    let query = params.to_query(listings);
    let items: Vec<PublicCard> = state
        .properties
        .search(&query)
        .await?
        .iter()
        .map(|p| to_card(p, listings))
        .collect();
    Ok(Json(json!({ "ok": true, "items": items, "page": page, "perPage": per_page })))
}

/// GET /api/public/featured
pub async fn featured(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let listings = &state.config.listings;
    let cards: Vec<PublicCard> = state
        .properties
        .featured(listings.featured_limit)
        .await?
        .iter()
        .map(|p| to_card(p, listings))
        .collect();
    Ok(Json(cards))
}

/// GET /api/public/properties/{slug}
pub async fn property_detail(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .properties
        .find_published(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("NotFound".into()))?;
    Ok(Json(to_detail(&item, &state.config.listings)))
}

/// GET /api/facilities
pub async fn facilities() -> impl IntoResponse {
    Json(FACILITY_GROUPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stayhaven_test_utils::fixtures;

    #[test]
    fn test_card_mapping() {
        let listings = ListingsConfig::default();
        let mut item = fixtures::property_with_images(3);
        item.property.slug = None;
        item.property.address = Some("12 Beach Rd".into());
        item.property.city = Some("  ".into());
        item.property.country = Some("Kenya".into());
        item.property.rating = None;
        item.images[2].is_thumb = true;

        let card = to_card(&item, &listings);
        assert_eq!(card.slug, item.property.id.to_string());
        assert_eq!(card.location, "12 Beach Rd, Kenya");
        assert_eq!(card.currency, "KES");
        assert_eq!(card.rating, 8.0);
        assert_eq!(card.rating_label, Some("Excellent"));
        assert_eq!(card.images[0], item.images[2].url);
        assert_eq!(card.images.len(), 3);
        assert_eq!(
            card.thumbnail.as_deref(),
            Some("https://res.cloudinary.com/demo/image/upload/c_fill,w_900,q_auto,f_auto/v1/villa-2.jpg")
        );
    }

    #[test]
    fn test_card_json_shape() {
        let card = to_card(&fixtures::property_with_images(1), &ListingsConfig::default());
        let value = serde_json::to_value(&card).unwrap();
        for key in ["pricePerNight", "type", "slug", "location", "images", "amenities"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_paging_defaults_and_clamps() {
        let listings = ListingsConfig::default();
        assert_eq!(ListingParams::default().paging(&listings), (1, 24));

        let params = ListingParams { page: Some("0".into()), per_page: Some("1000".into()), ..Default::default() };
        assert_eq!(params.paging(&listings), (1, 100));

        let params = ListingParams { page: Some("3".into()), per_page: Some("10".into()), ..Default::default() };
        let query = params.to_query(&listings);
        assert_eq!((query.offset, query.limit), (20, 10));

        let huge = ListingParams {
            page: Some(i64::MAX.to_string()),
            per_page: Some("100".into()),
            ..Default::default()
        };
        let query = huge.to_query(&listings);
        assert!(query.offset >= 0);
        assert_eq!(query.limit, 100);
        assert_eq!(huge.paging(&listings).0, i64::MAX / 100);
    }

    #[test]
    fn test_query_parsing_ignores_junk() {
        let params = ListingParams {
            q: Some("  ".into()),
            city: Some(" Mombasa ".into()),
            min_price: Some("abc".into()),
            max_price: Some("250.5".into()),
            rooms: Some("2".into()),
            amenities: Some("Pool, ,Wifi".into()),
            min_rating: Some("9".into()),
            sort: Some("price_desc".into()),
            ..Default::default()
        };
        let query = params.to_query(&ListingsConfig::default());
        assert_eq!(query.q, None);
        assert_eq!(query.city.as_deref(), Some("Mombasa"));
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, Some(250.5));
        assert_eq!(query.rooms, Some(2));
        assert_eq!(query.amenities, vec!["Pool".to_string(), "Wifi".to_string()]);
        assert_eq!(query.min_rating, Some(9.0));
        assert_eq!(query.default_rating, 8.0);
        assert_eq!(query.sort, ListingSort::PriceDesc);

        let odd = ListingParams { min_rating: Some("8.5".into()), ..Default::default() };
        assert_eq!(odd.to_query(&ListingsConfig::default()).min_rating, None);
    }
}
