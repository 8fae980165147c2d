//! Layout composition engine.
//!
//! Turns an ordered list of content units (text, optional image, vision and design
//! hints) into ordered pages whose units carry concrete split and overlay geometry
//! for an external renderer.
//!
//! Entry point: [`Composer`], constructed with a [`Config`] and an injected
//! [`ImageService`]. The pure building blocks live in [`layout`].

pub mod config;
pub mod errors;
pub mod imaging;
pub mod layout;
pub mod models;
pub mod pipeline;
pub mod telemetry;

pub use config::{Config, LayoutPolicy};
pub use errors::{FallbackReason, ImageError};
pub use imaging::{DecodingImageService, FixedImageService, ImageService, MetadataCache};
pub use models::{ContentUnit, DesignDirective, ImageRef, LayoutType, Page, VisionAnalysis};
pub use pipeline::{resolve_unit, ComposedPage, ComposedUnit, Composer};
pub use telemetry::init_tracing;
