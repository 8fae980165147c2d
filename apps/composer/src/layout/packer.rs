//! Page Packer: groups normalized units into pages under a fixed weight capacity.
//!
//! Greedy first-fit in input order: a unit goes on the current page if it fits,
//! otherwise the page is closed and the unit opens the next one. No reordering and
//! no look-ahead; reading order matters more than pack density.
//!
//! # Weight
//! - image (or caption): 50
//! - text: one point per 20 characters, capped at `text_weight_cap`
//! - the sum is clamped to the page capacity, so an oversized unit still gets a page

use tracing::debug;

use crate::config::LayoutPolicy;
use crate::models::page::Page;
use crate::models::unit::ContentUnit;

/// Packing weight of a single unit, clamped to `policy.page_capacity`.
pub fn unit_weight(unit: &ContentUnit, policy: &LayoutPolicy) -> u32 {
    let image_score = if unit.has_image() || unit.has_caption() {
        policy.image_weight
    } else {
        0
    };

    let chars = unit.body_len() as u64;
    let per = u64::from(policy.chars_per_weight.max(1));
    let text_score = chars.div_ceil(per).min(u64::from(policy.text_weight_cap)) as u32;

    (image_score + text_score).min(policy.page_capacity)
}

/// Packs units into pages, preserving order. Empty input yields no pages.
pub fn pack_pages(units: Vec<ContentUnit>, policy: &LayoutPolicy) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current: Vec<ContentUnit> = Vec::new();
    let mut current_weight = 0u32;

    for unit in units {
        let weight = unit_weight(&unit, policy);

        if current_weight + weight > policy.page_capacity && !current.is_empty() {
            pages.push(close_page(std::mem::take(&mut current), current_weight));
            current_weight = 0;
        }

        current_weight += weight;
        current.push(unit);
    }

    if !current.is_empty() {
        pages.push(close_page(current, current_weight));
    }

    pages
}

fn close_page(units: Vec<ContentUnit>, weight: u32) -> Page {
    let page = Page::from_units(units);
    debug!(
        units = page.article_count,
        weight,
        layout = page.layout_type.as_str(),
        "Closed page"
    );
    page
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
