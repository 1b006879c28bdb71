//! Finding canonicalizer: one loose record in, one canonical
//! [`Finding`] out — or `None` when the tooth cannot be resolved.

use serde_json::Value;
use tracing::debug;

use odonto_core::{
    Finding, ImageManifest, Severity, clamp01, coerce_overlays, dedupe_notes, round2,
};

use crate::alias;

/// Confidence assigned when the record carries none.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Canonicalize one raw finding record against the report's image
/// manifest.
///
/// The tooth is the only required field; everything else defaults per
/// the alias/coercion rules. The record's own image id, if any, is
/// discarded — the resolved index is authoritative.
pub fn canonicalize(raw: &Value, images: &ImageManifest) -> Option<Finding> {
    let obj = raw.as_object()?;

    let Some(tooth_fdi) = alias::first_present(obj, alias::TOOTH).and_then(alias::tooth_fdi)
    else {
        debug!("dropping finding record: unresolvable tooth");
        return None;
    };

    let severity = alias::first_present(obj, alias::SEVERITY)
        .and_then(Value::as_str)
        .and_then(Severity::parse_loose)
        .unwrap_or_default();

    let confidence = alias::first_present(obj, alias::CONFIDENCE)
        .and_then(alias::loose_f64)
        .map(|v| round2(clamp01(v)))
        .unwrap_or(DEFAULT_CONFIDENCE);

    let notes = dedupe_notes(
        alias::first_present(obj, alias::NOTES)
            .map(alias::loose_string_list)
            .unwrap_or_default(),
    );

    let requested = alias::first_present(obj, alias::IMAGE_INDEX).and_then(alias::loose_usize);
    let (image_index, image_id) = images.resolve(requested);

    let overlays = alias::first_present(obj, alias::OVERLAYS)
        .map(coerce_overlays)
        .unwrap_or_default();

    Some(Finding {
        tooth_fdi,
        notes,
        severity,
        confidence,
        image_index,
        image_id,
        overlays,
    })
}
