use serde::{Deserialize, Serialize};

use crate::models::unit::ContentUnit;

/// Layout family hint for a page, derived purely from how many units it holds.
/// Advisory metadata for the renderer; nothing in this crate branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    HeroSingle,
    SplitHalf,
    #[serde(rename = "magazine_grid_3")]
    MagazineGrid3,
    MultiColumnList,
}

impl LayoutType {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 | 1 => LayoutType::HeroSingle,
            2 => LayoutType::SplitHalf,
            3 => LayoutType::MagazineGrid3,
            _ => LayoutType::MultiColumnList,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::HeroSingle => "hero_single",
            LayoutType::SplitHalf => "split_half",
            LayoutType::MagazineGrid3 => "magazine_grid_3",
            LayoutType::MultiColumnList => "multi_column_list",
        }
    }
}

/// A set of content units rendered together on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub units: Vec<ContentUnit>,
    pub article_count: usize,
    pub layout_type: LayoutType,
}

impl Page {
    /// Finalizes a page from its unit list. Callers never build empty pages.
    pub fn from_units(units: Vec<ContentUnit>) -> Self {
        let article_count = units.len();
        Self {
            units,
            article_count,
            layout_type: LayoutType::for_count(article_count),
        }
    }
}
