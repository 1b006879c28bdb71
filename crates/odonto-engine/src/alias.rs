//! Declarative field-alias tables for raw generator output.
//!
//! The generator and manual-edit paths name the same fields half a
//! dozen ways. Each field gets exactly one alias list here, used
//! identically by every ingestion path, so the draft and rebuttal
//! flows can never drift apart on what they accept.

use serde_json::{Map, Value};

use odonto_core::notation;

/// Tooth identity.
pub const TOOTH: &[&str] = &[
    "tooth_fdi",
    "toothFDI",
    "FDI",
    "tooth",
    "toothNumber",
    "number",
    "id",
];

/// Note lines; a single string or an array of strings.
pub const NOTES: &[&str] = &["findings", "note", "notes"];

/// Free-text severity grade.
pub const SEVERITY: &[&str] = &["severity", "grade", "risk"];

/// Confidence score.
pub const CONFIDENCE: &[&str] = &["confidence", "confidence_score", "probability", "score"];

/// Image index into the manifest.
pub const IMAGE_INDEX: &[&str] = &["image_index", "imageIndex", "img_index", "image"];

/// Externally supplied image id. Accepted but always overwritten from
/// the manifest — the index is authoritative.
pub const IMAGE_ID: &[&str] = &["image_id", "imageId", "image_path", "path"];

/// Overlay list.
pub const OVERLAYS: &[&str] = &["overlays", "geometry", "shapes"];

/// Findings array of a whole draft document.
pub const REPORT_FINDINGS: &[&str] = &["findings", "results", "teeth"];

/// Explicit document-level overall confidence.
pub const OVERALL_CONFIDENCE: &[&str] = &["overall_confidence", "confidence", "score"];

/// Change list of a rebuttal document.
pub const CHANGES: &[&str] = &["changes", "operations", "patches"];

/// First non-null value among the aliases, in table order.
pub fn first_present<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
}

/// A finite float from a number or a numeric string.
pub fn loose_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// A non-negative index from a number or a numeric string.
pub fn loose_usize(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|u| usize::try_from(u).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

/// A note list from a single string or an array; non-strings are
/// skipped, blanks dropped.
pub fn loose_string_list(v: &Value) -> Vec<String> {
    match v {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        }
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Resolve a loose tooth reference (number or string) to FDI.
pub fn tooth_fdi(v: &Value) -> Option<u8> {
    match v {
        Value::Number(n) => n.as_i64().and_then(notation::numeric_to_fdi).or_else(|| {
            // Floats like 13.0 arrive from some serializers.
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .and_then(|f| notation::numeric_to_fdi(f as i64))
        }),
        Value::String(s) => notation::text_to_fdi(s),
        _ => None,
    }
}
