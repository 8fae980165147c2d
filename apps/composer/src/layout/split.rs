//! Split layout geometry: how a page is partitioned between image and text.
//!
//! # Rules
//! - aspect ratio ≥ 1.25 → `Row` (side by side), otherwise `Column` (stacked)
//! - the image share comes from the category: minimalist 0.45, editorial 0.55,
//!   street 0.70
//! - `Column` clamps the share into [0.50, 0.65]; stacked text gets cramped sooner
//! - `reverse` puts text first when the visual weight sits on the right

use serde::{Deserialize, Serialize};

const ROW_MIN_ASPECT_RATIO: f64 = 1.25;
const COLUMN_RATIO_MIN: f64 = 0.50;
const COLUMN_RATIO_MAX: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Image and text side by side.
    Row,
    /// Image and text stacked.
    Column,
}

/// Editorial category driving the image share of a split page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Minimalist / product pages: more room for text.
    Minimalist,
    #[default]
    StandardEditorial,
    /// Street / energetic pages: the image dominates.
    Street,
}

impl Category {
    /// Parses a free-form category label. Unknown or missing labels are editorial.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Category::default();
        };
        let lower = label.to_lowercase();
        if ["minimal", "product"].iter().any(|k| lower.contains(k)) {
            Category::Minimalist
        } else if ["street", "energetic", "bold", "dynamic"]
            .iter()
            .any(|k| lower.contains(k))
        {
            Category::Street
        } else {
            Category::StandardEditorial
        }
    }

    /// Default fraction of the page given to the image.
    pub fn image_ratio(&self) -> f64 {
        match self {
            Category::Minimalist => 0.45,
            Category::StandardEditorial => 0.55,
            Category::Street => 0.70,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitParams {
    pub direction: Direction,
    /// Fraction of the page allocated to the image, strictly between 0 and 1.
    pub ratio: f64,
    /// True when text precedes the image.
    pub reverse: bool,
}

/// Computes split geometry for a unit. Pure; identical inputs give identical output.
pub fn resolve_split(
    aspect_ratio: f64,
    category: Category,
    visual_weight: Option<&str>,
) -> SplitParams {
    let direction = if aspect_ratio.is_finite() && aspect_ratio >= ROW_MIN_ASPECT_RATIO {
        Direction::Row
    } else {
        Direction::Column
    };

    let mut ratio = category.image_ratio();
    if direction == Direction::Column {
        ratio = ratio.clamp(COLUMN_RATIO_MIN, COLUMN_RATIO_MAX);
    }

    SplitParams {
        direction,
        ratio,
        reverse: weight_on_right(visual_weight),
    }
}

/// True if the hint mentions "right" anywhere, case-insensitively. Catches
/// `right-heavy`, `toTheRight` and `visualWeightRight` alike.
fn weight_on_right(visual_weight: Option<&str>) -> bool {
    visual_weight
        .map(|hint| hint.to_lowercase().contains("right"))
        .unwrap_or(false)
}
