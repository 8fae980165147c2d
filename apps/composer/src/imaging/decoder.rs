//! Header-only image measurement backed by the `image` crate.
//!
//! Decoding is CPU-bound and touches the filesystem, so every measurement runs inside
//! `tokio::task::spawn_blocking`. Only the header is read; pixels are never decoded.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageReader;
use tracing::debug;

use crate::errors::ImageError;
use crate::imaging::ImageService;
use crate::models::unit::{ImageRef, ImageRefKind};

/// Measures file paths, data URIs and raw base64 payloads.
///
/// Remote URLs are reported as unavailable: the composer performs no network I/O.
#[derive(Debug, Clone, Default)]
pub struct DecodingImageService {
    /// Base directory for relative file paths. `None` resolves against the CWD.
    base_dir: Option<PathBuf>,
}

impl DecodingImageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw.trim());
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ImageService for DecodingImageService {
    async fn measure(&self, image: &ImageRef) -> Result<(u32, u32), ImageError> {
        let kind = image.kind();
        debug!(image = %image.preview(), ?kind, "Measuring image");

        match kind {
            ImageRefKind::Remote => Err(ImageError::Unavailable(format!(
                "remote image not fetched: {}",
                image.preview()
            ))),
            ImageRefKind::FilePath => {
                let path = self.resolve_path(image.as_str());
                tokio::task::spawn_blocking(move || measure_file(&path))
                    .await
                    .map_err(|e| ImageError::Join(e.to_string()))?
            }
            ImageRefKind::DataUri | ImageRefKind::Base64 => {
                let payload = base64_payload(image.as_str()).to_string();
                tokio::task::spawn_blocking(move || measure_base64(&payload))
                    .await
                    .map_err(|e| ImageError::Join(e.to_string()))?
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Blocking helpers
// ────────────────────────────────────────────────────────────────────────────

fn measure_file(path: &Path) -> Result<(u32, u32), ImageError> {
    if !path.exists() {
        return Err(ImageError::Unavailable(format!(
            "file not found: {}",
            path.display()
        )));
    }
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

fn measure_base64(payload: &str) -> Result<(u32, u32), ImageError> {
    let bytes = STANDARD.decode(payload.trim())?;
    measure_bytes(&bytes)
}

fn measure_bytes(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Strips a `data:image/...;base64,` prefix if present.
fn base64_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with("data:") {
        trimmed
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or("")
    } else {
        trimmed
    }
}
