//! Image source that never touches the network.

use std::collections::HashMap;

use async_trait::async_trait;
use stayhaven_media::{FetchError, ImageSource};

use crate::fixtures::png_bytes;

/// Serves a generated PNG for every URL, except for those given an
/// explicit status or body.
#[derive(Debug, Clone)]
pub struct StaticImageSource {
    default: Vec<u8>,
    bodies: HashMap<String, Vec<u8>>,
    statuses: HashMap<String, u16>,
}

impl StaticImageSource {
    /// Every URL yields a `width`×`height` PNG.
    pub fn sized(width: u32, height: u32) -> Self {
        Self { default: png_bytes(width, height), bodies: HashMap::new(), statuses: HashMap::new() }
    }

    pub fn with_body(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }
}

#[async_trait]
impl ImageSource for StaticImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(status) = self.statuses.get(url) {
            return Err(FetchError::Status(*status));
        }
        Ok(self.bodies.get(url).cloned().unwrap_or_else(|| self.default.clone()))
    }
}
