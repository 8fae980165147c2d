pub mod page;
pub mod unit;

pub use page::{LayoutType, Page};
pub use unit::{ContentUnit, DesignDirective, ImageRef, ImageRefKind, VisionAnalysis};
