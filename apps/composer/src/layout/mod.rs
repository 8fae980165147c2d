// Layout Composition Engine
// Implements: content normalization, page packing, split/overlay geometry.
// Everything here is pure and synchronous; async orchestration lives in `pipeline`.

pub mod metadata;
pub mod mode;
pub mod normalizer;
pub mod overlay;
pub mod packer;
pub mod split;

// Re-export the public API consumed by the pipeline and embedding applications.
pub use metadata::{ImageMetadata, Orientation};
pub use mode::{select_mode, LayoutMode};
pub use normalizer::{normalize_unit, normalize_units, split_body};
pub use overlay::{
    resolve_overlay, Align, BoundingBox, OverlayParams, OverlayResolution, OverlaySource,
    SafeZone,
};
pub use packer::{pack_pages, unit_weight};
pub use split::{resolve_split, Category, Direction, SplitParams};
