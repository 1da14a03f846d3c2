//! Image byte sources.

use std::time::Duration;

use async_trait::async_trait;
use stayhaven_config::MediaConfig;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("status {0}")]
    Status(u16),

    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("{0}")]
    Transport(String),
}

/// Anything that can turn an image URL into bytes.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetches images over HTTP with a timeout and a size cap.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpImageSource {
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stayhaven/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client, max_bytes })
    }

    pub fn from_config(config: &MediaConfig) -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(config.fetch_timeout_secs), config.max_image_bytes as u64)
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(FetchError::TooLarge { limit: self.max_bytes });
        }

        // Content-Length may be absent or wrong; enforce the cap while reading.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
        {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(FetchError::TooLarge { limit: self.max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one chunked response with no Content-Length and return its URL.
    async fn serve_chunked(chunks: Vec<Vec<u8>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let mut response = b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
            for chunk in chunks {
                response.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
                response.extend_from_slice(&chunk);
                response.extend_from_slice(b"\r\n");
            }
            response.extend_from_slice(b"0\r\n\r\n");
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/image.png")
    }

    #[tokio::test]
    async fn test_chunked_body_over_cap_is_rejected() {
        let url = serve_chunked(vec![vec![7u8; 10]; 3]).await;
        let source = HttpImageSource::new(Duration::from_secs(5), 16).unwrap();
        let err = source.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 16 }), "{err:?}");
    }

    #[tokio::test]
    async fn test_chunked_body_within_cap() {
        let url = serve_chunked(vec![vec![1u8; 8], vec![2u8; 8]]).await;
        let source = HttpImageSource::new(Duration::from_secs(5), 16).unwrap();
        let bytes = source.fetch(&url).await.unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[15], 2);
    }
}
