//! Canned rows and config for unit tests.

use chrono::{TimeZone, Utc};
use stayhaven_config::Config;
use stayhaven_db::{Property, PropertyImage, PropertyStatus, PropertyWithImages};
use uuid::Uuid;

/// Secret long enough to pass config validation.
pub const TEST_SESSION_SECRET: &str = "test-session-secret-0123456789";

/// A draft villa with every optional column filled in.
pub fn property() -> Property {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single().unwrap_or_default();
    Property {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        title: "Ocean View Villa".to_string(),
        slug: Some("ocean-view-villa-1a2b3c4d".to_string()),
        description: Some("Three bedrooms a short walk from the beach.".to_string()),
        address: Some("12 Beach Rd".to_string()),
        city: Some("Diani".to_string()),
        country: Some("Kenya".to_string()),
        price: 180.0,
        rooms: Some(2),
        bathrooms: Some(1),
        property_type: Some("Villa".to_string()),
        status: PropertyStatus::Draft,
        featured: false,
        active: true,
        latitude: Some(-4.28),
        longitude: Some(39.59),
        amenities: vec!["Hot tub".to_string()],
        facilities: vec!["Free Wifi".to_string(), "Private pool".to_string()],
        rating: Some(8.6),
        created_at: at,
        updated_at: at,
    }
}

/// `property()` with `count` CDN images in order and no thumbnail flag.
pub fn property_with_images(count: usize) -> PropertyWithImages {
    let property = property();
    let images = (0..count)
        .map(|i| PropertyImage {
            id: Uuid::new_v4(),
            property_id: property.id,
            url: image_url(i),
            alt: None,
            sort_order: i as i32,
            is_thumb: false,
        })
        .collect();
    PropertyWithImages { property, images, owner: None }
}

pub fn image_url(index: usize) -> String {
    format!("https://res.cloudinary.com/demo/image/upload/v1/villa-{index}.jpg")
}

/// Defaults with a session secret that is not the development one.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.apply_env_overrides(|key| match key {
        "STAYHAVEN_SESSION_SECRET" => Some(TEST_SESSION_SECRET.to_string()),
        _ => None,
    });
    config
}

/// An in-memory PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
    let mut out = std::io::Cursor::new(Vec::new());
    // writing to a Vec cannot fail for a valid RGB image
    let _ = img.write_to(&mut out, image::ImageFormat::Png);
    out.into_inner()
}
