use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to obtain dimensions for an image reference.
///
/// Never fatal: the metadata cache converts every variant into
/// `ImageMetadata::unavailable()` and the overlay resolver falls back.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Base64 payload error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image lookup timed out after {millis}ms")]
    Timeout { millis: u128 },

    #[error("Blocking decode task failed: {0}")]
    Join(String),
}

/// Why the overlay resolver returned the default box instead of a computed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    #[error("image dimensions are unknown")]
    MissingDimensions,

    #[error("no structurally valid safe area")]
    NoValidBoxes,

    #[error("box geometry produced a non-finite value")]
    NonFinite,

    #[error("unit resolution task did not complete")]
    TaskFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_reason_serializes_snake_case() {
        let json = serde_json::to_string(&FallbackReason::NoValidBoxes).unwrap();
        assert_eq!(json, "\"no_valid_boxes\"");
    }

    #[test]
    fn test_image_error_display_includes_reference() {
        let err = ImageError::Unavailable("https://cdn/x.png".to_string());
        assert!(err.to_string().contains("https://cdn/x.png"));
    }
}
