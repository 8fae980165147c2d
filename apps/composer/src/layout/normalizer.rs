//! Content Normalizer: splits oversized units into page-sized fragments.
//!
//! A page that shares space with an image holds roughly 1100 characters; a text-only
//! page roughly 2200. Units above their budget are cut into fragments, preferring to
//! cut after a sentence-ending period whenever that keeps at least half the budget.
//!
//! # Fragment rules
//! - Fragment ids are `{parent}_part{n}`, n starting at 1
//! - Fragment 1 keeps the image, design directive and vision analysis
//! - Later fragments lose the image and the image-bound vision geometry, and get
//!   " (Continued)" appended to the title and headline

use tracing::debug;

use crate::config::LayoutPolicy;
use crate::models::unit::ContentUnit;

const CONTINUED_SUFFIX: &str = " (Continued)";

/// Minimum share of the budget a sentence-boundary cut must preserve.
const SENTENCE_CUT_FLOOR: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes every unit, preserving input order.
pub fn normalize_units(units: Vec<ContentUnit>, policy: &LayoutPolicy) -> Vec<ContentUnit> {
    units
        .into_iter()
        .flat_map(|unit| normalize_unit(unit, policy))
        .collect()
}

/// Splits a single unit if its body exceeds its budget.
///
/// A unit at or below budget comes back unchanged as the only element.
pub fn normalize_unit(unit: ContentUnit, policy: &LayoutPolicy) -> Vec<ContentUnit> {
    let first_limit = first_fragment_limit(&unit, policy);
    let body_len = unit.body_len();

    if body_len <= first_limit {
        return vec![unit];
    }

    let chunks = split_body(&unit.body, first_limit, policy.limit_text_only);
    if chunks.len() < 2 {
        // Only trailing whitespace pushed the body over budget.
        return vec![unit];
    }

    debug!(
        unit_id = %unit.id,
        body_len,
        first_limit,
        fragments = chunks.len(),
        "Splitting oversized content unit"
    );

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| make_fragment(&unit, index, chunk))
        .collect()
}

/// Cuts `body` into trimmed chunks. The first chunk is bounded by `first_limit`,
/// all later chunks by `rest_limit`. Limits are in characters.
///
/// Whitespace-only chunks are dropped, so the concatenation of the result equals the
/// original body up to whitespace at the cut points.
pub fn split_body(body: &str, first_limit: usize, rest_limit: usize) -> Vec<String> {
    let chars: Vec<char> = body.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < len {
        let limit = if start == 0 { first_limit } else { rest_limit }.max(1);
        let end = cut_point(&chars, start, limit);

        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        start = end;
    }

    chunks
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn first_fragment_limit(unit: &ContentUnit, policy: &LayoutPolicy) -> usize {
    if unit.has_image() {
        policy.limit_with_image
    } else {
        policy.limit_text_only
    }
}

/// Returns the exclusive end of the chunk starting at `start`.
///
/// The last `.` in `[start, start + limit)` wins if it sits at or after
/// `start + limit * 0.5`; otherwise the cut is hard at the budget.
fn cut_point(chars: &[char], start: usize, limit: usize) -> usize {
    let len = chars.len();
    let end = (start + limit).min(len);
    if end == len {
        return end;
    }

    let floor = start as f64 + limit as f64 * SENTENCE_CUT_FLOOR;
    match chars[start..end].iter().rposition(|&c| c == '.') {
        Some(offset) if (start + offset) as f64 >= floor => start + offset + 1,
        _ => end,
    }
}

fn make_fragment(parent: &ContentUnit, index: usize, body: String) -> ContentUnit {
    let mut fragment = parent.clone();
    fragment.id = format!("{}_part{}", parent.id, index + 1);
    fragment.body = body;

    if index > 0 {
        fragment.image = None;
        fragment.title = format!("{}{CONTINUED_SUFFIX}", parent.title);
        fragment.headline = parent
            .headline
            .as_ref()
            .map(|h| format!("{h}{CONTINUED_SUFFIX}"));
        fragment.vision = parent
            .vision
            .as_ref()
            .map(|v| v.without_geometry())
            .filter(|v| !v.is_empty());
        fragment.design = parent.design.clone().filter(|d| !d.is_empty());
    }

    fragment
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::unit::{DesignDirective, ImageRef, VisionAnalysis};

    fn make_unit(id: &str, body: String, with_image: bool) -> ContentUnit {
        let mut unit = ContentUnit::new(id, "Spring Issue", body);
        if with_image {
            unit.image = Some(ImageRef::new("assets/spring.jpg"));
        }
        unit
    }

    /// Sentences of exactly 50 characters each, ending in a period.
    fn sentences(count: usize) -> String {
        let sentence = format!("{}.", "x".repeat(49));
        sentence.repeat(count)
    }

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    // ── normalize_unit ──────────────────────────────────────────────────────

    #[test]
    fn test_short_unit_is_unchanged() {
        let unit = make_unit("a1", "Short body.".to_string(), true);
        let out = normalize_unit(unit.clone(), &LayoutPolicy::default());
        assert_eq!(out, vec![unit]);
    }

    #[test]
    fn test_unit_exactly_at_limit_is_unchanged() {
        let unit = make_unit("a1", "y".repeat(1100), true);
        let out = normalize_unit(unit, &LayoutPolicy::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a1");
    }

    #[test]
    fn test_image_unit_3000_chars_yields_two_fragments() {
        let unit = make_unit("a1", sentences(60), true); // 3000 chars
        let out = normalize_unit(unit, &LayoutPolicy::default());

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "a1_part1");
        assert_eq!(out[1].id, "a1_part2");
        assert!(out[0].body.chars().count() <= 1100);
        assert!(out[1].body.chars().count() <= 2200);
        assert!(out[0].image.is_some());
        assert!(out[1].image.is_none());
        assert_eq!(out[0].title, "Spring Issue");
        assert_eq!(out[1].title, "Spring Issue (Continued)");
    }

    #[test]
    fn test_text_only_unit_uses_higher_limit() {
        let unit = make_unit("t1", sentences(40), false); // 2000 chars
        let out = normalize_unit(unit, &LayoutPolicy::default());
        assert_eq!(out.len(), 1, "2000 chars fits the 2200 text-only budget");
    }

    #[test]
    fn test_continuation_inherits_design_and_palette_only() {
        let mut unit = make_unit("a1", sentences(60), true);
        unit.headline = Some("Bloom".to_string());
        unit.design = Some(DesignDirective {
            alignment: Some("left".to_string()),
            ..Default::default()
        });
        unit.vision = Some(VisionAnalysis {
            mood: Some("Fresh".to_string()),
            safe_areas: vec![serde_json::json!([0.1, 0.1, 0.4, 0.4])],
            visual_weight: Some("right".to_string()),
            ..Default::default()
        });

        let out = normalize_unit(unit, &LayoutPolicy::default());
        let first = &out[0];
        let second = &out[1];

        assert_eq!(first.headline.as_deref(), Some("Bloom"));
        assert_eq!(first.vision.as_ref().unwrap().safe_areas.len(), 1);

        assert_eq!(second.headline.as_deref(), Some("Bloom (Continued)"));
        assert_eq!(second.design, first.design);
        let vision = second.vision.as_ref().unwrap();
        assert_eq!(vision.mood.as_deref(), Some("Fresh"));
        assert!(vision.safe_areas.is_empty());
        assert!(vision.visual_weight.is_none());
    }

    #[test]
    fn test_continuation_without_parent_data_fabricates_nothing() {
        let unit = make_unit("a1", sentences(60), true);
        let out = normalize_unit(unit, &LayoutPolicy::default());
        assert!(out[1].design.is_none());
        assert!(out[1].vision.is_none());
        assert!(out[1].headline.is_none());
    }

    #[test]
    fn test_normalize_units_preserves_order() {
        let units = vec![
            make_unit("a", "short".to_string(), false),
            make_unit("b", sentences(60), true),
            make_unit("c", "short".to_string(), true),
        ];
        let ids: Vec<String> = normalize_units(units, &LayoutPolicy::default())
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec!["a", "b_part1", "b_part2", "c"]);
    }

    // ── split_body ──────────────────────────────────────────────────────────

    #[test]
    fn test_cut_lands_after_period() {
        // Period at index 79 of a 100-char budget → cut after it.
        let body = format!("{}.{}", "a".repeat(79), "b".repeat(200));
        let chunks = split_body(&body, 100, 100);
        assert_eq!(chunks[0].chars().count(), 80);
        assert!(chunks[0].ends_with('.'));
    }

    #[test]
    fn test_period_too_early_forces_hard_cut() {
        // Period at index 10 < 50% of the 100-char budget.
        let body = format!("{}.{}", "a".repeat(10), "b".repeat(200));
        let chunks = split_body(&body, 100, 100);
        assert_eq!(chunks[0].chars().count(), 100);
    }

    #[test]
    fn test_period_exactly_at_half_budget_is_used() {
        let body = format!("{}.{}", "a".repeat(50), "b".repeat(200));
        let chunks = split_body(&body, 100, 100);
        assert_eq!(chunks[0].chars().count(), 51);
    }

    #[test]
    fn test_round_trip_up_to_whitespace() {
        let body = "The tide came in. Gulls circled above the pier. ".repeat(80);
        let chunks = split_body(&body, 1100, 2200);
        assert!(chunks.len() > 1);
        assert_eq!(strip_ws(&chunks.concat()), strip_ws(&body));
        assert!(chunks[0].chars().count() <= 1100);
        for chunk in &chunks[1..] {
            assert!(chunk.chars().count() <= 2200);
        }
    }

    #[test]
    fn test_multibyte_body_splits_on_char_boundaries() {
        let body = "한국어 문장입니다. ".repeat(300);
        let chunks = split_body(&body, 1100, 2200);
        assert!(chunks.len() >= 2);
        assert_eq!(strip_ws(&chunks.concat()), strip_ws(&body));
    }

    #[test]
    fn test_empty_body_yields_no_chunks() {
        assert!(split_body("", 100, 100).is_empty());
    }
}
