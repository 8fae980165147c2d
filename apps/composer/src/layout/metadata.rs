use serde::{Deserialize, Serialize};

/// Measured dimensions of an image. Computed once per image reference, then immutable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// `width / height`; 1.0 when the height is 0 or the image is unavailable.
    pub aspect_ratio: f64,
}

/// Coarse shape of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

const LANDSCAPE_MIN_RATIO: f64 = 1.2;
const PORTRAIT_MAX_RATIO: f64 = 0.8;

impl ImageMetadata {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let aspect_ratio = if height == 0 {
            1.0
        } else {
            f64::from(width) / f64::from(height)
        };
        Self {
            width,
            height,
            aspect_ratio,
        }
    }

    /// Metadata for an image that could not be measured (or does not exist).
    pub fn unavailable() -> Self {
        Self::from_dimensions(0, 0)
    }

    /// True when both dimensions are usable for coordinate conversion.
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn orientation(&self) -> Orientation {
        if self.aspect_ratio > LANDSCAPE_MIN_RATIO {
            Orientation::Landscape
        } else if self.aspect_ratio < PORTRAIT_MAX_RATIO {
            Orientation::Portrait
        } else {
            Orientation::Square
        }
    }
}
