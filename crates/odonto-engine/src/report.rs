//! Document-level reconciliation flows.
//!
//! A draft document is whatever the generator produced: a bare array
//! of finding records, or an object wrapping one under a handful of
//! known keys. A rebuttal document carries an ordered change list.
//! Both flows end in the same place: a tooth-sorted, capped,
//! canonical finding set plus an overall confidence.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use odonto_core::{Finding, ImageManifest};

use crate::alias;
use crate::apply::{FindingChange, apply};
use crate::canonical::canonicalize;
use crate::confidence::aggregate;
use crate::error::ReconcileError;
use crate::merge::merge;

/// What the portal stores per report version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub overall_confidence: Option<f64>,
}

/// Parse a raw document body into JSON.
pub fn parse_document(body: &str) -> Result<Value, ReconcileError> {
    Ok(serde_json::from_str(body)?)
}

/// Reconcile a generator draft into a canonical payload.
///
/// Records that cannot be canonicalized are dropped, duplicates per
/// tooth merged. Overall confidence prefers a document-level value
/// over the per-finding mean.
pub fn reconcile_draft(doc: &Value, images: &ImageManifest) -> ReportPayload {
    let (records, explicit) = match doc {
        Value::Array(items) => (items.as_slice(), None),
        Value::Object(obj) => {
            let records = alias::first_present(obj, alias::REPORT_FINDINGS)
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice);
            let explicit =
                alias::first_present(obj, alias::OVERALL_CONFIDENCE).and_then(alias::loose_f64);
            (records, explicit)
        }
        _ => {
            debug!("draft document is neither array nor object");
            (&[][..], None)
        }
    };

    let findings = merge(records.iter().filter_map(|r| canonicalize(r, images)).collect());
    let dropped = records.len().saturating_sub(findings.len());
    info!(
        kept = findings.len(),
        dropped, "reconciled draft finding set"
    );

    let overall_confidence = aggregate(&findings, explicit);
    ReportPayload { findings, overall_confidence }
}

/// Apply a rebuttal change list to the previous version's findings.
pub fn reconcile_rebuttal(
    base: &[Finding],
    changes: &[FindingChange],
    images: &ImageManifest,
) -> ReportPayload {
    let findings = apply(base, changes, images);
    info!(
        base = base.len(),
        changes = changes.len(),
        kept = findings.len(),
        "reconciled rebuttal finding set"
    );
    let overall_confidence = aggregate(&findings, None);
    ReportPayload { findings, overall_confidence }
}

/// Extract the ordered change list from a rebuttal document.
///
/// The list may sit at the top level or under a known wrapper key.
/// Entries that do not deserialize as changes are skipped; only a
/// document with no list at all is an error.
pub fn parse_changes(doc: &Value) -> Result<Vec<FindingChange>, ReconcileError> {
    let items = match doc {
        Value::Array(items) => items,
        Value::Object(obj) => alias::first_present(obj, alias::CHANGES)
            .and_then(Value::as_array)
            .ok_or(ReconcileError::MissingChangeList("no change array under a known key"))?,
        _ => return Err(ReconcileError::MissingChangeList("document is not an array or object")),
    };

    Ok(items
        .iter()
        .filter_map(|item| match serde_json::from_value::<FindingChange>(item.clone()) {
            Ok(change) => Some(change),
            Err(err) => {
                debug!(%err, "skipping malformed change entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ChangeOp;
    use odonto_core::{ImageRef, Severity};
    use serde_json::json;

    fn images() -> ImageManifest {
        ImageManifest::new(vec![
            ImageRef { index: 0, id: "pan-001".into(), url: None },
            ImageRef { index: 1, id: "bw-002".into(), url: None },
        ])
    }

    #[test]
    fn draft_from_bare_array() {
        let doc = json!([
            {"tooth": "UR3", "findings": ["plaque"], "severity": "sev"},
            {"tooth": 46, "findings": ["caries"], "severity": "high", "confidence": 0.9}
        ]);
        let payload = reconcile_draft(&doc, &images());
        assert_eq!(payload.findings.len(), 2);
        assert_eq!(payload.findings[0].tooth_fdi, 13);
        assert_eq!(payload.findings[1].tooth_fdi, 46);
        assert_eq!(payload.overall_confidence, Some(0.7));
    }

    #[test]
    fn draft_from_wrapped_object_with_explicit_confidence() {
        let doc = json!({
            "results": [{"tooth": 11, "findings": ["chip"]}],
            "overall_confidence": 0.88
        });
        let payload = reconcile_draft(&doc, &images());
        assert_eq!(payload.findings.len(), 1);
        assert_eq!(payload.overall_confidence, Some(0.88));
    }

    #[test]
    fn draft_merges_duplicate_teeth() {
        let doc = json!([
            {"tooth": 16, "findings": ["caries"], "severity": "high", "confidence": 0.6},
            {"tooth": 16, "findings": ["wear"], "severity": "low", "confidence": 0.8}
        ]);
        let payload = reconcile_draft(&doc, &images());
        assert_eq!(payload.findings.len(), 1);
        assert_eq!(payload.findings[0].notes, vec!["caries", "wear"]);
        assert_eq!(payload.findings[0].severity, Severity::High);
        assert_eq!(payload.findings[0].confidence, 0.8);
    }

    #[test]
    fn draft_drops_unresolvable_records() {
        let doc = json!([
            {"tooth": "molar", "findings": ["?"]},
            {"tooth": 21, "findings": ["chip"]}
        ]);
        let payload = reconcile_draft(&doc, &images());
        assert_eq!(payload.findings.len(), 1);
        assert_eq!(payload.findings[0].tooth_fdi, 21);
    }

    #[test]
    fn empty_draft_has_no_confidence() {
        let payload = reconcile_draft(&json!([]), &images());
        assert!(payload.findings.is_empty());
        assert_eq!(payload.overall_confidence, None);
    }

    #[test]
    fn scalar_draft_document_degrades_to_empty() {
        let payload = reconcile_draft(&json!("oops"), &images());
        assert!(payload.findings.is_empty());
    }

    #[test]
    fn parse_document_rejects_non_json() {
        assert!(matches!(
            parse_document("{not json"),
            Err(ReconcileError::MalformedDocument(_))
        ));
    }

    #[test]
    fn parse_changes_from_wrapped_list() {
        let doc = json!({
            "changes": [
                {"operation": "remove", "target_tooth": 21},
                {"operation": "add", "target_tooth": "LL6",
                 "replacement": {"findings": ["abscess"], "severity": "high"}}
            ]
        });
        let changes = parse_changes(&doc).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].operation, ChangeOp::Remove);
        assert_eq!(changes[1].operation, ChangeOp::Add);
    }

    #[test]
    fn parse_changes_skips_malformed_entries() {
        let doc = json!([
            {"operation": "remove", "target_tooth": 21},
            {"no_operation_here": true},
            "not even an object"
        ]);
        let changes = parse_changes(&doc).unwrap();
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn parse_changes_requires_a_list() {
        assert!(parse_changes(&json!({"summary": "n/a"})).is_err());
        assert!(parse_changes(&json!(42)).is_err());
    }

    #[test]
    fn rebuttal_flow_end_to_end() {
        let draft = reconcile_draft(
            &json!([
                {"tooth": 21, "findings": ["chip"], "severity": "low", "confidence": 0.6},
                {"tooth": 36, "findings": ["caries"], "severity": "moderate", "confidence": 0.8}
            ]),
            &images(),
        );

        let changes = parse_changes(&json!({
            "changes": [
                {"operation": "remove", "target_tooth": 21},
                {"operation": "modify", "target_tooth": 36,
                 "replacement": {"findings": ["caries"], "severity": "high", "confidence": 0.95}}
            ]
        }))
        .unwrap();

        let payload = reconcile_rebuttal(&draft.findings, &changes, &images());
        assert_eq!(payload.findings.len(), 1);
        assert_eq!(payload.findings[0].tooth_fdi, 36);
        assert_eq!(payload.findings[0].severity, Severity::High);
        assert_eq!(payload.overall_confidence, Some(0.95));
    }
}
