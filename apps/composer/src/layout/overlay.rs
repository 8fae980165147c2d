//! Overlay layout geometry: where text sits on top of an image.
//!
//! Resolution order:
//! 1. An explicit alignment directive from the design stage selects a fixed preset.
//! 2. Otherwise the largest valid vision safe area is converted to page percentages.
//! 3. Otherwise the default box. Resolution never fails.
//!
//! Safe areas arrive as `[ymin, xmin, ymax, xmax]`, either normalized (every
//! coordinate within ±1.2) or in pixels. The scale is inferred per box.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::FallbackReason;
use crate::layout::metadata::ImageMetadata;

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// Coordinates at or below this magnitude are treated as fractions of the image.
const NORMALIZED_TOLERANCE: f64 = 1.2;
/// Percent points added to left/top and removed twice from the width.
const PADDING_PCT: f64 = 2.0;
const LEFT_PCT_MAX: f64 = 95.0;
const TOP_PCT_MAX: f64 = 90.0;
const WIDTH_PCT_MIN: f64 = 20.0;
const WIDTH_PCT_MAX: f64 = 85.0;
/// Box centers right of this fraction of the width align right.
const RIGHT_ALIGN_THRESHOLD: f64 = 0.55;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    /// Parses an upstream alignment label: `left`, `Right`, `text-center`, `centre`.
    pub fn from_directive(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        let bare = lower.strip_prefix("text-").unwrap_or(&lower);
        match bare {
            "left" => Some(Align::Left),
            "right" => Some(Align::Right),
            "center" | "centre" => Some(Align::Center),
            _ => None,
        }
    }
}

/// Text box placement, in percent of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayParams {
    pub left_pct: f64,
    pub top_pct: f64,
    pub width_pct: f64,
    pub align: Align,
}

impl OverlayParams {
    /// The box used whenever nothing better can be computed.
    pub const FALLBACK: OverlayParams = OverlayParams {
        left_pct: 8.0,
        top_pct: 10.0,
        width_pct: 60.0,
        align: Align::Left,
    };

    /// Fixed preset for an explicit alignment directive.
    pub fn preset(align: Align) -> Self {
        match align {
            Align::Left => OverlayParams {
                left_pct: 6.0,
                top_pct: 10.0,
                width_pct: 55.0,
                align,
            },
            Align::Right => OverlayParams {
                left_pct: 39.0,
                top_pct: 10.0,
                width_pct: 55.0,
                align,
            },
            Align::Center => OverlayParams {
                left_pct: 15.0,
                top_pct: 30.0,
                width_pct: 70.0,
                align,
            },
        }
    }
}

/// A candidate safe area, `(ymin, xmin, ymax, xmax)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl BoundingBox {
    /// Parses a loosely-typed JSON entry. Anything other than four finite numbers is
    /// rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        if items.len() != 4 {
            return None;
        }
        let mut coords = [0.0f64; 4];
        for (slot, item) in coords.iter_mut().zip(items) {
            let n = item.as_f64()?;
            if !n.is_finite() {
                return None;
            }
            *slot = n;
        }
        Some(BoundingBox {
            ymin: coords[0],
            xmin: coords[1],
            ymax: coords[2],
            xmax: coords[3],
        })
    }

    pub fn is_normalized(&self) -> bool {
        [self.ymin, self.xmin, self.ymax, self.xmax]
            .iter()
            .all(|c| c.abs() <= NORMALIZED_TOLERANCE)
    }

    /// Converts to pixel space, scaling y by height and x by width when normalized.
    pub fn to_pixels(&self, meta: &ImageMetadata) -> Self {
        if !self.is_normalized() {
            return *self;
        }
        let w = f64::from(meta.width);
        let h = f64::from(meta.height);
        BoundingBox {
            ymin: self.ymin * h,
            xmin: self.xmin * w,
            ymax: self.ymax * h,
            xmax: self.xmax * w,
        }
    }

    /// Area, or `None` if either extent is negative or the result is not finite.
    pub fn area(&self) -> Option<f64> {
        let width = self.xmax - self.xmin;
        let height = self.ymax - self.ymin;
        if width < 0.0 || height < 0.0 {
            return None;
        }
        let area = width * height;
        area.is_finite().then_some(area)
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.xmin + self.xmax) / 2.0, (self.ymin + self.ymax) / 2.0)
    }
}

/// Where a text box sits within the image, by thirds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeZone {
    pub vertical: Band,
    pub horizontal: Band,
}

impl SafeZone {
    /// Locates a pixel-space box within an image of known dimensions.
    pub fn locate(pixel_box: &BoundingBox, meta: &ImageMetadata) -> Option<Self> {
        if !meta.is_known() {
            return None;
        }
        let (cx, cy) = pixel_box.center();
        Some(SafeZone {
            vertical: band(cy / f64::from(meta.height)),
            horizontal: band(cx / f64::from(meta.width)),
        })
    }

    /// `center`, `left`, `top`, `bottom_right`, ...
    pub fn label(&self) -> String {
        let vertical = match self.vertical {
            Band::Start => Some("top"),
            Band::Middle => None,
            Band::End => Some("bottom"),
        };
        let horizontal = match self.horizontal {
            Band::Start => Some("left"),
            Band::Middle => None,
            Band::End => Some("right"),
        };
        match (vertical, horizontal) {
            (None, None) => "center".to_string(),
            (Some(v), None) => v.to_string(),
            (None, Some(h)) => h.to_string(),
            (Some(v), Some(h)) => format!("{v}_{h}"),
        }
    }
}

fn band(fraction: f64) -> Band {
    if fraction < 1.0 / 3.0 {
        Band::Start
    } else if fraction > 2.0 / 3.0 {
        Band::End
    } else {
        Band::Middle
    }
}

/// Where an `OverlayParams` came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlaySource {
    /// Explicit alignment directive preset.
    Authority,
    /// Largest valid safe area; `index` is its position in the input list.
    SafeArea { index: usize },
    Fallback { reason: FallbackReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayResolution {
    pub params: OverlayParams,
    pub source: OverlaySource,
    /// Position of the chosen safe area, when one was used.
    pub zone: Option<SafeZone>,
}

impl OverlayResolution {
    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            params: OverlayParams::FALLBACK,
            source: OverlaySource::Fallback { reason },
            zone: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution
// ────────────────────────────────────────────────────────────────────────────

/// Resolves the overlay box for one unit. Pure and total.
pub fn resolve_overlay(
    meta: &ImageMetadata,
    safe_areas: &[Value],
    authority: Option<Align>,
) -> OverlayResolution {
    if let Some(align) = authority {
        return OverlayResolution {
            params: OverlayParams::preset(align),
            source: OverlaySource::Authority,
            zone: None,
        };
    }

    match resolve_from_safe_areas(meta, safe_areas) {
        Ok(resolution) => resolution,
        Err(reason) => OverlayResolution::fallback(reason),
    }
}

/// Picks the largest valid box. Ties go to the first one encountered.
///
/// Returns the candidate index and its pixel-space box.
pub fn select_largest_box(
    meta: &ImageMetadata,
    safe_areas: &[Value],
) -> Option<(usize, BoundingBox)> {
    let mut best: Option<(usize, BoundingBox, f64)> = None;

    for (index, raw) in safe_areas.iter().enumerate() {
        let Some(parsed) = BoundingBox::from_value(raw) else {
            debug!(index, candidate = %raw, "Discarding malformed safe area");
            continue;
        };
        let pixel_box = parsed.to_pixels(meta);
        let Some(area) = pixel_box.area() else {
            debug!(index, candidate = %raw, "Discarding safe area with negative extent");
            continue;
        };
        if best.map_or(true, |(_, _, best_area)| area > best_area) {
            best = Some((index, pixel_box, area));
        }
    }

    best.map(|(index, pixel_box, _)| (index, pixel_box))
}

fn resolve_from_safe_areas(
    meta: &ImageMetadata,
    safe_areas: &[Value],
) -> Result<OverlayResolution, FallbackReason> {
    if !meta.is_known() {
        return Err(FallbackReason::MissingDimensions);
    }

    let (index, pixel_box) =
        select_largest_box(meta, safe_areas).ok_or(FallbackReason::NoValidBoxes)?;

    let params = box_to_params(&pixel_box, meta)?;

    Ok(OverlayResolution {
        params,
        source: OverlaySource::SafeArea { index },
        zone: SafeZone::locate(&pixel_box, meta),
    })
}

/// Converts a pixel box to padded, clamped percentages.
fn box_to_params(
    pixel_box: &BoundingBox,
    meta: &ImageMetadata,
) -> Result<OverlayParams, FallbackReason> {
    let w = f64::from(meta.width);
    let h = f64::from(meta.height);

    let left = 100.0 * pixel_box.xmin / w + PADDING_PCT;
    let top = 100.0 * pixel_box.ymin / h + PADDING_PCT;
    let width = 100.0 * (pixel_box.xmax - pixel_box.xmin) / w - 2.0 * PADDING_PCT;

    if ![left, top, width].iter().all(|v| v.is_finite()) {
        return Err(FallbackReason::NonFinite);
    }

    let (center_x, _) = pixel_box.center();
    let align = if center_x > w * RIGHT_ALIGN_THRESHOLD {
        Align::Right
    } else {
        Align::Left
    };

    Ok(OverlayParams {
        left_pct: left.clamp(0.0, LEFT_PCT_MAX),
        top_pct: top.clamp(0.0, TOP_PCT_MAX),
        width_pct: width.clamp(WIDTH_PCT_MIN, WIDTH_PCT_MAX),
        align,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
