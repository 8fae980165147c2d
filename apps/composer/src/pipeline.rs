//! Composition pipeline: the entry point that wires normalization, packing and
//! per-unit geometry together.
//!
//! Flow: normalize_units → pack_pages (once, sequential) → per unit, concurrently:
//!       image metadata (memoized per call, timed out) → resolve_unit → reassemble
//!       in order.
//!
//! Per-unit work is isolated. A unit whose task fails is annotated with fallback
//! geometry; its siblings and the page list are unaffected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{Config, LayoutPolicy};
use crate::errors::FallbackReason;
use crate::imaging::{ImageService, MetadataCache};
use crate::layout::metadata::{ImageMetadata, Orientation};
use crate::layout::mode::{select_mode, LayoutMode};
use crate::layout::normalizer::normalize_units;
use crate::layout::overlay::{resolve_overlay, Align, OverlayResolution, OverlaySource};
use crate::layout::packer::{pack_pages, unit_weight};
use crate::layout::split::{resolve_split, Category, SplitParams};
use crate::models::page::{LayoutType, Page};
use crate::models::unit::ContentUnit;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A content unit annotated with everything the renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedUnit {
    pub unit: ContentUnit,
    /// Packing weight the unit was placed with.
    pub weight: u32,
    pub metadata: ImageMetadata,
    pub orientation: Orientation,
    pub mode: LayoutMode,
    pub split: SplitParams,
    pub overlay: OverlayResolution,
    /// Named position of the chosen safe area (`top_left`, `center`, ...).
    pub safe_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedPage {
    pub units: Vec<ComposedUnit>,
    pub article_count: usize,
    pub layout_type: LayoutType,
}

// ────────────────────────────────────────────────────────────────────────────
// Pure per-unit step
// ────────────────────────────────────────────────────────────────────────────

/// Computes split and overlay geometry for one unit. Pure; no I/O.
pub fn resolve_unit(
    unit: ContentUnit,
    metadata: ImageMetadata,
    policy: &LayoutPolicy,
) -> ComposedUnit {
    let category = Category::from_label(unit.category_label());
    let split = resolve_split(metadata.aspect_ratio, category, unit.visual_weight());

    let authority = unit.alignment_label().and_then(|label| {
        let parsed = Align::from_directive(label);
        if parsed.is_none() {
            debug!(unit_id = %unit.id, label, "Ignoring unrecognized alignment directive");
        }
        parsed
    });
    let overlay = resolve_overlay(&metadata, unit.safe_areas(), authority);

    ComposedUnit {
        weight: unit_weight(&unit, policy),
        mode: select_mode(&unit),
        orientation: metadata.orientation(),
        safe_zone: overlay.zone.map(|zone| zone.label()),
        metadata,
        split,
        overlay,
        unit,
    }
}

/// Annotation used when a unit's resolution task did not complete.
fn degraded_unit(unit: ContentUnit, policy: &LayoutPolicy) -> ComposedUnit {
    let metadata = ImageMetadata::unavailable();
    let category = Category::from_label(unit.category_label());
    ComposedUnit {
        weight: unit_weight(&unit, policy),
        mode: select_mode(&unit),
        split: resolve_split(metadata.aspect_ratio, category, unit.visual_weight()),
        overlay: OverlayResolution::fallback(FallbackReason::TaskFailed),
        orientation: metadata.orientation(),
        safe_zone: None,
        metadata,
        unit,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Composer
// ────────────────────────────────────────────────────────────────────────────

/// Explicitly constructed pipeline handle. Cheap to clone.
///
/// Image metadata is memoized for the duration of one `compose` call only, so a
/// long-lived composer holds no per-image state between calls.
#[derive(Clone)]
pub struct Composer {
    config: Config,
    images: Arc<dyn ImageService>,
}

impl Composer {
    pub fn new(config: Config, images: Arc<dyn ImageService>) -> Self {
        Self { config, images }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalizes and packs units without resolving geometry.
    pub fn paginate(&self, units: Vec<ContentUnit>) -> Vec<Page> {
        let policy = &self.config.policy;
        let input_count = units.len();
        let normalized = normalize_units(units, policy);
        let pages = pack_pages(normalized, policy);
        info!(
            input_units = input_count,
            pages = pages.len(),
            "Paginated content units"
        );
        pages
    }

    /// Runs the full pipeline. Never fails: every unit gets some layout.
    pub async fn compose(&self, units: Vec<ContentUnit>) -> Vec<ComposedPage> {
        let pages = self.paginate(units);

        let shapes: Vec<(usize, LayoutType)> = pages
            .iter()
            .map(|p| (p.article_count, p.layout_type))
            .collect();
        let flat: Vec<ContentUnit> = pages.into_iter().flat_map(|p| p.units).collect();

        let cache = Arc::new(MetadataCache::new(self.config.image_timeout));
        let mut resolved = self.resolve_all(flat, &cache).await.into_iter();

        let composed: Vec<ComposedPage> = shapes
            .into_iter()
            .map(|(count, layout_type)| ComposedPage {
                units: resolved.by_ref().take(count).collect(),
                article_count: count,
                layout_type,
            })
            .collect();

        let fallbacks = composed
            .iter()
            .flat_map(|p| &p.units)
            .filter(|u| matches!(u.overlay.source, OverlaySource::Fallback { .. }))
            .count();
        info!(
            pages = composed.len(),
            overlay_fallbacks = fallbacks,
            distinct_images = cache.len(),
            "Composition complete"
        );

        composed
    }

    /// Resolves every unit concurrently, bounded by `max_concurrency`, and returns the
    /// results in input order.
    async fn resolve_all(
        &self,
        units: Vec<ContentUnit>,
        cache: &Arc<MetadataCache>,
    ) -> Vec<ComposedUnit> {
        let policy = self.config.policy.clone();
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, unit) in units.iter().cloned().enumerate() {
            let limiter = Arc::clone(&limiter);
            let images = Arc::clone(&self.images);
            let cache = Arc::clone(cache);
            let policy = policy.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails on shutdown.
                let _permit = limiter.acquire_owned().await.ok();
                let metadata = cache.metadata(images.as_ref(), unit.image_ref()).await;
                (index, resolve_unit(unit, metadata, &policy))
            });
        }

        let mut slots: Vec<Option<ComposedUnit>> = (0..units.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, composed)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(composed);
                    }
                }
                Err(e) => warn!(error = %e, "Unit resolution task failed; using fallback layout"),
            }
        }

        slots
            .into_iter()
            .zip(units)
            .map(|(slot, unit)| slot.unwrap_or_else(|| degraded_unit(unit, &policy)))
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
