//! Image Service: the one latency-bearing collaborator of the composer.
//!
//! Only `measure` is needed: layout works from dimensions, never from pixels.
//! Implementations are carried as `Arc<dyn ImageService>` and injected into
//! `Composer::new`, so tests and embedding applications can swap backends freely.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::ImageError;
use crate::models::unit::ImageRef;

pub mod cache;
pub mod decoder;

pub use cache::MetadataCache;
pub use decoder::DecodingImageService;

/// Measures images by reference. Must not mutate anything.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Returns `(width, height)` in pixels.
    async fn measure(&self, image: &ImageRef) -> Result<(u32, u32), ImageError>;
}

/// In-memory service with known dimensions. Unknown references are unavailable.
#[derive(Debug, Clone, Default)]
pub struct FixedImageService {
    dimensions: HashMap<ImageRef, (u32, u32)>,
}

impl FixedImageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, image: impl Into<String>, width: u32, height: u32) -> Self {
        self.dimensions
            .insert(ImageRef::new(image), (width, height));
        self
    }
}

#[async_trait]
impl ImageService for FixedImageService {
    async fn measure(&self, image: &ImageRef) -> Result<(u32, u32), ImageError> {
        self.dimensions
            .get(image)
            .copied()
            .ok_or_else(|| ImageError::Unavailable(image.preview()))
    }
}
