//! Image resource fetching
//!
//! Capture must wait for the selection's picture before rasterizing,
//! otherwise the export silently omits it.

use crate::{DateQuestError, Result};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Source of raw image bytes for a reference
pub trait ImageFetcher: Send + Sync {
    /// Fetch the encoded bytes behind `image_ref`
    fn fetch(&self, image_ref: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Fetches `http(s)://` references over the network and reads everything
/// else (`file://` URLs, plain paths) from disk
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Create a fetcher with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DateQuestError::CaptureError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

/// Local path for a non-HTTP reference, if it is one
pub fn local_path(image_ref: &str) -> Option<PathBuf> {
    if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
        return None;
    }
    let path = image_ref.strip_prefix("file://").unwrap_or(image_ref);
    Some(PathBuf::from(path))
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, image_ref: &str) -> Result<Vec<u8>> {
        if let Some(path) = local_path(image_ref) {
            debug!(path = %path.display(), "reading ticket image from disk");
            return tokio::fs::read(&path).await.map_err(|e| {
                DateQuestError::CaptureError(format!(
                    "Failed to read image {}: {}",
                    path.display(),
                    e
                ))
            });
        }

        debug!(url = image_ref, "fetching ticket image");
        let response = self
            .client
            .get(image_ref)
            .send()
            .await
            .map_err(|e| DateQuestError::CaptureError(format!("Failed to fetch image: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DateQuestError::CaptureError(format!(
                "Image host returned {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DateQuestError::CaptureError(format!("Failed to read image: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
