use serde::{Deserialize, Serialize};

use crate::models::unit::ContentUnit;

/// Template family the renderer should use for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Image and text in separate regions; driven by `SplitParams`.
    Split,
    /// Text over the image; driven by `OverlayParams`.
    Overlay,
}

const SPLIT_KEYWORDS: [&str; 3] = ["split", "product", "separated"];

/// Picks the template family for a unit.
///
/// Units without an image always split. Otherwise any of the design strategy, the
/// category label or the vision recommendation mentioning split/product/separated
/// selects `Split`; everything else overlays.
pub fn select_mode(unit: &ContentUnit) -> LayoutMode {
    if !unit.has_image() {
        return LayoutMode::Split;
    }

    let labels = [
        unit.design.as_ref().and_then(|d| d.layout_strategy.as_deref()),
        unit.category_label(),
        unit.vision.as_ref().and_then(|v| v.recommendation.as_deref()),
    ];

    let wants_split = labels.iter().flatten().any(|label| {
        let lower = label.to_lowercase();
        SPLIT_KEYWORDS.iter().any(|k| lower.contains(k))
    });

    if wants_split {
        LayoutMode::Split
    } else {
        LayoutMode::Overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::unit::{DesignDirective, ImageRef, VisionAnalysis};

    fn image_unit() -> ContentUnit {
        let mut unit = ContentUnit::new("m1", "Title", "Body.");
        unit.image = Some(ImageRef::new("img/m1.png"));
        unit
    }

    #[test]
    fn test_text_only_unit_splits() {
        let unit = ContentUnit::new("t", "Title", "Body.");
        assert_eq!(select_mode(&unit), LayoutMode::Split);
    }

    #[test]
    fn test_image_unit_defaults_to_overlay() {
        assert_eq!(select_mode(&image_unit()), LayoutMode::Overlay);
    }

    #[test]
    fn test_strategy_and_category_select_split() {
        let mut unit = image_unit();
        unit.design = Some(DesignDirective {
            layout_strategy: Some("separated_grid".to_string()),
            ..Default::default()
        });
        assert_eq!(select_mode(&unit), LayoutMode::Split);

        let mut unit = image_unit();
        unit.category = Some("TYPE_PRODUCT_FOCUS".to_string());
        assert_eq!(select_mode(&unit), LayoutMode::Split);
    }

    #[test]
    fn test_vision_recommendation_selects_split() {
        let mut unit = image_unit();
        unit.vision = Some(VisionAnalysis {
            recommendation: Some("Separated".to_string()),
            ..Default::default()
        });
        assert_eq!(select_mode(&unit), LayoutMode::Split);
    }

    #[test]
    fn test_overlay_strategy_stays_overlay() {
        let mut unit = image_unit();
        unit.design = Some(DesignDirective {
            layout_strategy: Some("hero_overlay_smart".to_string()),
            ..Default::default()
        });
        assert_eq!(select_mode(&unit), LayoutMode::Overlay);
    }
}
