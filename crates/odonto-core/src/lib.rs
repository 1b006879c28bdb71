pub mod finding;
pub mod geometry;
pub mod notation;

pub use finding::{Finding, ImageManifest, ImageRef, MAX_FINDINGS, Severity, dedupe_notes};
pub use geometry::{MAX_OVERLAYS, Overlay, clamp01, coerce_overlay, coerce_overlays, round2};
pub use notation::{fdi_to_universal, numeric_to_fdi, text_to_fdi, universal_to_fdi};
