//! URL → dimension checks for listing photos.

use std::io::Cursor;
use std::sync::Arc;

use futures_util::future::join_all;
use image::ImageReader;
use serde::Serialize;
use stayhaven_common::images::{is_blob_or_data_url, is_http_url, ImageProblem, MIN_HEIGHT, MIN_WIDTH};
use stayhaven_config::MediaConfig;
use tracing::{debug, warn};

use crate::source::{FetchError, ImageSource};

const LOCAL_URL_REASON: &str =
    "Local blob/data URL detected - upload file to the image CDN (stable URL) before submitting.";
const INVALID_URL_REASON: &str = "Invalid URL format.";
const UNDECODABLE_REASON: &str = "Could not parse image (invalid image or unsupported format)";

/// A photo that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageCheck {
    pub width: u32,
    pub height: u32,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageVerdict {
    Accepted(ImageCheck),
    Rejected {
        reason: String,
        /// Present when the image decoded but was too small.
        dimensions: Option<(u32, u32)>,
    },
}

impl ImageVerdict {
    fn reject(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into(), dimensions: None }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected { reason, .. } => Some(reason),
        }
    }
}

#[derive(Clone)]
pub struct ImageValidator {
    source: Arc<dyn ImageSource>,
    min_width: u32,
    min_height: u32,
}

impl ImageValidator {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self { source, min_width: MIN_WIDTH, min_height: MIN_HEIGHT }
    }

    pub fn from_config(source: Arc<dyn ImageSource>, config: &MediaConfig) -> Self {
        Self { source, min_width: config.min_width, min_height: config.min_height }
    }

    pub async fn validate_image_url(&self, url: &str) -> ImageVerdict {
        if is_blob_or_data_url(url) {
            return ImageVerdict::reject(LOCAL_URL_REASON);
        }
        if !is_http_url(url) {
            return ImageVerdict::reject(INVALID_URL_REASON);
        }

        let bytes = match self.source.fetch(url).await {
            Ok(bytes) => bytes,
            Err(FetchError::Status(code)) => {
                return ImageVerdict::reject(format!("Failed to fetch image (status {code})"));
            }
            Err(e) => {
                warn!("Image fetch failed for {}: {}", url, e);
                return ImageVerdict::reject(format!("Error fetching/validating image: {e}"));
            }
        };

        let Some((width, height, format)) = decode_dimensions(&bytes) else {
            return ImageVerdict::reject(UNDECODABLE_REASON);
        };

        if width < self.min_width || height < self.min_height {
            return ImageVerdict::Rejected {
                reason: format!(
                    "Image too small: {width}×{height} (min {}×{})",
                    self.min_width, self.min_height
                ),
                dimensions: Some((width, height)),
            };
        }

        debug!("Accepted {} ({}×{})", url, width, height);
        ImageVerdict::Accepted(ImageCheck { width, height, format })
    }

    /// Validate every URL concurrently, returning only the failures in
    /// submission order.
    pub async fn validate_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<ImageProblem> {
        let checks = urls.iter().enumerate().map(|(index, url)| async move {
            let url = url.as_ref();
            (index, url.to_string(), self.validate_image_url(url).await)
        });

        let mut problems: Vec<ImageProblem> = join_all(checks)
            .await
            .into_iter()
            .filter_map(|(index, url, verdict)| match verdict {
                ImageVerdict::Accepted(_) => None,
                ImageVerdict::Rejected { reason, .. } => Some(ImageProblem { index, url, reason }),
            })
            .collect();
        problems.sort_by_key(|p| p.index);
        problems
    }
}

fn decode_dimensions(bytes: &[u8]) -> Option<(u32, u32, Option<String>)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format().ok()?;
    let format = reader.format().map(|f| format!("{f:?}").to_lowercase());
    let (width, height) = reader.into_dimensions().ok()?;
    Some((width, height, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[derive(Default)]
    struct FakeSource {
        bodies: HashMap<String, Vec<u8>>,
        statuses: HashMap<String, u16>,
        delays: HashMap<String, Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ImageSource for FakeSource {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(url) {
                tokio::time::sleep(*delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(code) = self.statuses.get(url) {
                return Err(FetchError::Status(*code));
            }
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Transport("connection refused".into()))
        }
    }

    fn validator(source: FakeSource) -> ImageValidator {
        ImageValidator::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_local_urls_rejected_without_fetch() {
        let v = validator(FakeSource::default());
        for url in ["blob:http://localhost/abc", "data:image/png;base64,AAAA"] {
            assert_eq!(v.validate_image_url(url).await.reason(), Some(LOCAL_URL_REASON));
        }
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let v = validator(FakeSource::default());
        assert_eq!(v.validate_image_url("villa.jpg").await.reason(), Some(INVALID_URL_REASON));
        assert_eq!(v.validate_image_url("ftp://x.y/villa.jpg").await.reason(), Some(INVALID_URL_REASON));
    }

    #[tokio::test]
    async fn test_http_status_failure() {
        let mut source = FakeSource::default();
        source.statuses.insert("https://img.test/gone.jpg".into(), 404);
        let verdict = validator(source).validate_image_url("https://img.test/gone.jpg").await;
        assert_eq!(verdict.reason(), Some("Failed to fetch image (status 404)"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let verdict = validator(FakeSource::default())
            .validate_image_url("https://img.test/unreachable.jpg")
            .await;
        assert_eq!(verdict.reason(), Some("Error fetching/validating image: connection refused"));
    }

    #[tokio::test]
    async fn test_undecodable_bytes() {
        let mut source = FakeSource::default();
        source.bodies.insert("https://img.test/x.jpg".into(), b"<html>nope</html>".to_vec());
        let verdict = validator(source).validate_image_url("https://img.test/x.jpg").await;
        assert_eq!(verdict.reason(), Some(UNDECODABLE_REASON));
    }

    #[tokio::test]
    async fn test_too_small() {
        let mut source = FakeSource::default();
        source.bodies.insert("https://img.test/small.png".into(), png(640, 480));
        let verdict = validator(source).validate_image_url("https://img.test/small.png").await;
        assert_eq!(
            verdict,
            ImageVerdict::Rejected {
                reason: "Image too small: 640×480 (min 1200×800)".into(),
                dimensions: Some((640, 480)),
            }
        );
    }

    #[tokio::test]
    async fn test_large_enough() {
        let mut source = FakeSource::default();
        source.bodies.insert("https://img.test/big.png".into(), png(1200, 800));
        let verdict = validator(source).validate_image_url("https://img.test/big.png").await;
        assert_eq!(
            verdict,
            ImageVerdict::Accepted(ImageCheck { width: 1200, height: 800, format: Some("png".into()) })
        );
    }

    #[tokio::test]
    async fn test_validate_all_reports_failures_by_index() {
        let mut source = FakeSource::default();
        source.bodies.insert("https://img.test/ok.png".into(), png(1600, 900));
        source.bodies.insert("https://img.test/tiny.png".into(), png(10, 10));
        let urls = vec![
            "https://img.test/ok.png".to_string(),
            "blob:http://localhost/1".to_string(),
            "https://img.test/ok.png".to_string(),
            "https://img.test/tiny.png".to_string(),
        ];
        let problems = validator(source).validate_all(&urls).await;
        let indexes: Vec<usize> = problems.iter().map(|p| p.index).collect();
        assert_eq!(indexes, vec![1, 3]);
        assert_eq!(problems[1].url, "https://img.test/tiny.png");
        assert!(problems[1].reason.starts_with("Image too small: 10×10"));
    }

    #[tokio::test]
    async fn test_validate_all_sorts_failures_finishing_out_of_order() {
        let mut source = FakeSource::default();
        for i in 0..5 {
            source.bodies.insert(format!("https://img.test/{i}.png"), png(1600, 900));
        }
        source.statuses.insert("https://img.test/1.png".into(), 404);
        source.delays.insert("https://img.test/1.png".into(), Duration::from_millis(80));
        source.statuses.insert("https://img.test/4.png".into(), 500);
        source.bodies.insert("https://img.test/2.png".into(), png(10, 10));
        source.delays.insert("https://img.test/2.png".into(), Duration::from_millis(40));
        let source = Arc::new(source);

        let urls: Vec<String> = (0..5).map(|i| format!("https://img.test/{i}.png")).collect();
        let problems = ImageValidator::new(source.clone()).validate_all(&urls).await;

        let indexes: Vec<usize> = problems.iter().map(|p| p.index).collect();
        assert_eq!(indexes, vec![1, 2, 4]);
        assert_eq!(problems[0].url, "https://img.test/1.png");
        assert_eq!(problems[2].url, "https://img.test/4.png");
        // both slow fetches were in flight together
        assert!(source.peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_config_minimums() {
        let mut source = FakeSource::default();
        source.bodies.insert("https://img.test/mid.png".into(), png(800, 600));
        let config = MediaConfig { min_width: 640, min_height: 480, ..MediaConfig::default() };
        let v = ImageValidator::from_config(Arc::new(source), &config);
        assert!(v.validate_image_url("https://img.test/mid.png").await.is_accepted());
    }
}
