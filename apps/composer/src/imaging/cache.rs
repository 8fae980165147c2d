//! Per-reference memoization of image metadata.
//!
//! Continuation fragments and repeated layouts often point at the same image, so the
//! decode cost is paid once per reference rather than once per unit. Concurrent
//! lookups of the same reference share a single in-flight measurement.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::errors::ImageError;
use crate::imaging::ImageService;
use crate::layout::metadata::ImageMetadata;
use crate::models::unit::ImageRef;

pub struct MetadataCache {
    entries: Mutex<HashMap<ImageRef, Arc<OnceCell<ImageMetadata>>>>,
    timeout: Duration,
}

impl MetadataCache {
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Returns metadata for `image`, measuring it at most once.
    ///
    /// Missing references, service errors and timeouts all produce
    /// `ImageMetadata::unavailable()`. Failures are cached as well so every unit
    /// sharing a reference sees the same result.
    pub async fn metadata(
        &self,
        service: &dyn ImageService,
        image: Option<&ImageRef>,
    ) -> ImageMetadata {
        let Some(image) = image else {
            return ImageMetadata::unavailable();
        };

        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.entry(image.clone()).or_default().clone()
        };

        *cell.get_or_init(|| self.measure(service, image)).await
    }

    /// Number of distinct references seen so far.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn measure(&self, service: &dyn ImageService, image: &ImageRef) -> ImageMetadata {
        let outcome = match tokio::time::timeout(self.timeout, service.measure(image)).await {
            Ok(result) => result,
            Err(_) => Err(ImageError::Timeout {
                millis: self.timeout.as_millis(),
            }),
        };

        match outcome {
            Ok((width, height)) => {
                debug!(image = %image.preview(), width, height, "Image measured");
                ImageMetadata::from_dimensions(width, height)
            }
            Err(e) => {
                warn!(
                    image = %image.preview(),
                    error = %e,
                    "Image metadata unavailable; overlay will fall back"
                );
                ImageMetadata::unavailable()
            }
        }
    }
}
