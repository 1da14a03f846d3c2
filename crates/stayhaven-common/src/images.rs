//! Listing image rules and image-CDN URL helpers.

use serde::{Deserialize, Serialize};
use url::Url;

/// A listing must carry at least this many photos.
pub const MIN_IMAGES: usize = 8;
pub const MIN_WIDTH: u32 = 1200;
pub const MIN_HEIGHT: u32 = 800;

pub const CDN_HOST: &str = "res.cloudinary.com";
pub const DEFAULT_CDN_TRANSFORM: &str = "c_fill,w_900,q_auto,f_auto";

/// One image that failed server-side validation.
///
/// `index` is the zero-based position in the submitted list so the form can
/// flag the right thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProblem {
    pub index: usize,
    pub url: String,
    pub reason: String,
}

/// Browser-local object URLs that never reached the CDN.
pub fn is_blob_or_data_url(url: &str) -> bool {
    url.starts_with("blob:") || url.starts_with("data:")
}

pub fn is_http_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

pub fn is_cdn_url(url: &str) -> bool {
    url.contains(CDN_HOST)
}

/// Insert a CDN transformation segment after `/upload/`.
///
/// Non-CDN URLs and URLs without exactly one `/upload/` come back unchanged.
pub fn cdn_transform(url: &str, transform: &str) -> String {
    if !is_cdn_url(url) {
        return url.to_string();
    }
    let parts: Vec<&str> = url.split("/upload/").collect();
    match parts.as_slice() {
        [head, tail] => format!("{head}/upload/{transform}/{tail}"),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_urls() {
        assert!(is_blob_or_data_url("blob:http://localhost/1234"));
        assert!(is_blob_or_data_url("data:image/png;base64,AAAA"));
        assert!(!is_blob_or_data_url("https://example.com/a.jpg"));
    }

    #[test]
    fn test_http_urls() {
        assert!(is_http_url("https://example.com/a.jpg"));
        assert!(is_http_url("http://example.com/a.jpg"));
        assert!(!is_http_url("ftp://example.com/a.jpg"));
        assert!(!is_http_url("not a url"));
    }

    #[test]
    fn test_cdn_transform() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1/villa.jpg";
        assert_eq!(
            cdn_transform(url, DEFAULT_CDN_TRANSFORM),
            "https://res.cloudinary.com/demo/image/upload/c_fill,w_900,q_auto,f_auto/v1/villa.jpg"
        );
        assert_eq!(cdn_transform("https://example.com/upload/x.jpg", "w_10"), "https://example.com/upload/x.jpg");
        let twice = "https://res.cloudinary.com/a/upload/b/upload/c.jpg";
        assert_eq!(cdn_transform(twice, "w_10"), twice);
    }
}
