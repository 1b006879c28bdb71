//! Finding merger/deduplicator: one reducer, one set of tie-breaks.
//!
//! Repeated generations frequently emit several records for the same
//! tooth. The reducer folds them into one finding per tooth:
//!
//! - notes: case-insensitive union, insertion order
//! - overlays: concatenated in input order, capped at 12
//! - severity: maximum by the total order
//! - confidence + image reference: the strictly greatest confidence
//!   wins; ties keep the first-seen record
//!
//! Output is sorted ascending by tooth and capped at 40 findings,
//! dropping the lowest-confidence entries first.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::warn;

use odonto_core::{Finding, MAX_FINDINGS, MAX_OVERLAYS, dedupe_notes};

/// Merge findings sharing a tooth into one finding per tooth.
///
/// Idempotent: `merge(merge(x)) == merge(x)`.
pub fn merge(findings: Vec<Finding>) -> Vec<Finding> {
    let mut by_tooth: BTreeMap<u8, Finding> = BTreeMap::new();

    for finding in findings {
        match by_tooth.entry(finding.tooth_fdi) {
            Entry::Vacant(slot) => {
                let mut finding = finding;
                finding.notes = dedupe_notes(finding.notes);
                finding.overlays.truncate(MAX_OVERLAYS);
                slot.insert(finding);
            }
            Entry::Occupied(mut slot) => {
                fold_into(slot.get_mut(), finding);
            }
        }
    }

    cap_findings(by_tooth.into_values().collect())
}

/// Fold `next` into the accumulated finding for the same tooth.
fn fold_into(acc: &mut Finding, next: Finding) {
    let mut notes = std::mem::take(&mut acc.notes);
    notes.extend(next.notes);
    acc.notes = dedupe_notes(notes);

    acc.overlays.extend(next.overlays);
    acc.overlays.truncate(MAX_OVERLAYS);

    acc.severity = acc.severity.max(next.severity);

    // Strictly greater: equal confidence keeps the first-seen image.
    if next.confidence > acc.confidence {
        acc.confidence = next.confidence;
        acc.image_index = next.image_index;
        acc.image_id = next.image_id;
    }
}

/// Sort ascending by tooth and enforce the per-set cap.
///
/// Beyond [`MAX_FINDINGS`], the lowest-confidence findings go first;
/// confidence ties drop the higher tooth number. (The legacy behavior
/// of truncating by ascending tooth silently favoured low-numbered
/// teeth over clinically important ones.)
pub(crate) fn cap_findings(mut findings: Vec<Finding>) -> Vec<Finding> {
    if findings.len() > MAX_FINDINGS {
        warn!(
            total = findings.len(),
            cap = MAX_FINDINGS,
            "finding set over cap, dropping lowest-confidence entries"
        );
        findings.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then(a.tooth_fdi.cmp(&b.tooth_fdi))
        });
        findings.truncate(MAX_FINDINGS);
    }
    findings.sort_by_key(|f| f.tooth_fdi);
    findings
}
