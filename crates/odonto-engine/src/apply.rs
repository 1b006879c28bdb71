//! Finding-change applicator.
//!
//! A rebuttal arrives as an ordered list of explicit patch operations
//! against the previous version's finding set. Changes are applied
//! strictly in input order, so a later change to the same tooth
//! overrides an earlier one. Nothing here throws for data-shape
//! reasons: unresolvable targets, unknown operations, and missing
//! replacement fragments are all no-ops.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use odonto_core::{Finding, ImageManifest};

use crate::alias;
use crate::canonical::canonicalize;
use crate::merge::{cap_findings, merge};

/// Patch operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Add,
    Modify,
    Remove,
    /// Anything the schema validation upstream let through that we
    /// still do not recognize; applied as a no-op.
    Unknown,
}

impl ChangeOp {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Self::Add,
            "modify" => Self::Modify,
            "remove" => Self::Remove,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::Remove => "remove",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChangeOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChangeOp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// One explicit patch operation from the rebuttal service.
///
/// `target_tooth` stays loose (number or any supported notation) and
/// resolves through the same converter as draft ingestion. The
/// replacement fragment is a loose finding record canonicalized on
/// application; the rationale is carried for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingChange {
    pub operation: ChangeOp,
    pub target_tooth: Value,
    #[serde(default)]
    pub replacement: Option<Value>,
    #[serde(default)]
    pub rationale: Option<String>,
}

/// Apply an ordered change list to a base finding set.
///
/// - `remove`: delete the tooth's entry; no-op if absent.
/// - `add`: canonicalize the fragment for the target tooth; merge
///   into an existing entry rather than overwriting it.
/// - `modify`: canonicalize the fragment and replace the entry;
///   behaves like `add` when the tooth is absent.
///
/// The result is sorted ascending by tooth and capped like any other
/// finding set.
pub fn apply(base: &[Finding], changes: &[FindingChange], images: &ImageManifest) -> Vec<Finding> {
    let mut by_tooth: BTreeMap<u8, Finding> = base
        .iter()
        .cloned()
        .map(|f| (f.tooth_fdi, f))
        .collect();

    for change in changes {
        let Some(tooth) = alias::tooth_fdi(&change.target_tooth) else {
            debug!(tooth_ref = %change.target_tooth, "skipping change: unresolvable target tooth");
            continue;
        };

        match change.operation {
            ChangeOp::Remove => {
                by_tooth.remove(&tooth);
            }
            ChangeOp::Add => {
                let Some(incoming) = canonical_replacement(change, tooth, images) else {
                    continue;
                };
                match by_tooth.remove(&tooth) {
                    Some(existing) => {
                        let merged = merge(vec![existing, incoming]);
                        for f in merged {
                            by_tooth.insert(f.tooth_fdi, f);
                        }
                    }
                    None => {
                        by_tooth.insert(tooth, incoming);
                    }
                }
            }
            ChangeOp::Modify => {
                let Some(incoming) = canonical_replacement(change, tooth, images) else {
                    continue;
                };
                by_tooth.insert(tooth, incoming);
            }
            ChangeOp::Unknown => {
                debug!(tooth, "skipping change: unknown operation");
            }
        }
    }

    cap_findings(by_tooth.into_values().collect())
}

/// Canonicalize the change's replacement fragment with the target
/// tooth forced in; `None` when there is no usable fragment.
fn canonical_replacement(
    change: &FindingChange,
    tooth: u8,
    images: &ImageManifest,
) -> Option<Finding> {
    let fragment = change.replacement.as_ref()?;
    let mut obj = fragment.as_object()?.clone();
    // The change's target wins over whatever tooth the fragment names.
    obj.insert("tooth_fdi".to_string(), Value::from(tooth));
    let finding = canonicalize(&Value::Object(obj), images);
    if finding.is_none() {
        debug!(tooth, op = %change.operation, "skipping change: unusable replacement fragment");
    }
    finding
}
