//! Canonical clinical record types shared by every engine flow.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Overlay;

/// Maximum findings carried by one report version.
pub const MAX_FINDINGS: usize = 40;

/// Severity grade of a clinical finding.
///
/// The derived total order (`Low < Moderate < High`) drives
/// "most severe wins" merges.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Low,
    Moderate,
    High,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    /// Permissive parse of the free-text grades the generator emits.
    ///
    /// Recognized synonyms only; anything else is `None` and the
    /// caller defaults to [`Severity::Low`]. Matching is exact after
    /// trim + lowercase — "sev" is not "severe".
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "severe" | "critical" | "serious" => Some(Self::High),
            "moderate" | "medium" | "mid" | "med" => Some(Self::Moderate),
            "low" | "mild" | "minor" | "slight" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical clinical observation attached to one tooth.
///
/// Within one finding set, `tooth_fdi` is unique and the set is
/// sorted ascending by tooth; both invariants are maintained by the
/// merge and apply reducers, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub tooth_fdi: u8,
    /// Note lines, deduplicated case-insensitively, insertion order.
    #[serde(rename = "findings")]
    pub notes: Vec<String>,
    pub severity: Severity,
    /// In `[0, 1]`, two decimal places.
    pub confidence: f64,
    /// Index into the report's image manifest; authoritative for
    /// `image_id`.
    pub image_index: usize,
    pub image_id: String,
    pub overlays: Vec<Overlay>,
}

/// One entry of the image manifest supplied by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub index: usize,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The report's available images, 0-based, authoritative for
/// resolving `image_index → image_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageManifest {
    images: Vec<ImageRef>,
}

impl ImageManifest {
    pub fn new(images: Vec<ImageRef>) -> Self {
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Resolve a requested index to `(index, id)`.
    ///
    /// Out-of-range or absent requests fall back to image 0. The id
    /// always comes from the manifest — an externally supplied id is
    /// corrected, never trusted. An empty manifest yields an empty id
    /// (the manifest itself being absent is the caller's failure to
    /// surface, not this engine's).
    pub fn resolve(&self, requested: Option<usize>) -> (usize, String) {
        let index = requested.filter(|i| *i < self.images.len()).unwrap_or(0);
        let id = self
            .images
            .get(index)
            .map(|img| img.id.clone())
            .unwrap_or_default();
        (index, id)
    }
}

/// Deduplicate note lines case-insensitively, keeping the first
/// spelling and insertion order. Blank lines are dropped.
pub fn dedupe_notes<I>(notes: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for note in notes {
        let trimmed = note.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(trimmed.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_total_order() {
        assert!(Severity::Low < Severity::Moderate);
        assert!(Severity::Moderate < Severity::High);
        assert_eq!(Severity::Low.max(Severity::High), Severity::High);
    }

    #[test]
    fn severity_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Severity::Moderate).unwrap(), "\"moderate\"");
        let back: Severity = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(back, Severity::High);
    }

    #[test]
    fn severity_loose_synonyms() {
        assert_eq!(Severity::parse_loose("Severe"), Some(Severity::High));
        assert_eq!(Severity::parse_loose(" medium "), Some(Severity::Moderate));
        assert_eq!(Severity::parse_loose("mild"), Some(Severity::Low));
    }

    #[test]
    fn severity_partial_words_not_matched() {
        // "sev" must not resolve; the canonicalizer defaults it to low.
        assert_eq!(Severity::parse_loose("sev"), None);
        assert_eq!(Severity::parse_loose("hi"), None);
        assert_eq!(Severity::parse_loose(""), None);
    }

    #[test]
    fn manifest_resolves_valid_index() {
        let manifest = ImageManifest::new(vec![
            ImageRef { index: 0, id: "img-a".into(), url: None },
            ImageRef { index: 1, id: "img-b".into(), url: Some("https://example/b".into()) },
        ]);
        assert_eq!(manifest.resolve(Some(1)), (1, "img-b".to_string()));
    }

    #[test]
    fn manifest_out_of_range_falls_back_to_zero() {
        let manifest = ImageManifest::new(vec![ImageRef {
            index: 0,
            id: "img-a".into(),
            url: None,
        }]);
        assert_eq!(manifest.resolve(Some(7)), (0, "img-a".to_string()));
        assert_eq!(manifest.resolve(None), (0, "img-a".to_string()));
    }

    #[test]
    fn empty_manifest_yields_empty_id() {
        let manifest = ImageManifest::default();
        assert_eq!(manifest.resolve(Some(2)), (0, String::new()));
    }

    #[test]
    fn notes_dedupe_case_insensitive() {
        let notes = dedupe_notes(
            ["Caries", "caries", "  ", "Wear", "CARIES"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(notes, vec!["Caries", "Wear"]);
    }

    #[test]
    fn finding_wire_field_names() {
        let finding = Finding {
            tooth_fdi: 16,
            notes: vec!["caries".into()],
            severity: Severity::High,
            confidence: 0.85,
            image_index: 0,
            image_id: "img-a".into(),
            overlays: vec![],
        };
        let v = serde_json::to_value(&finding).unwrap();
        assert_eq!(v["tooth_fdi"], 16);
        assert_eq!(v["findings"][0], "caries");
        assert_eq!(v["severity"], "high");
        assert_eq!(v["confidence"], 0.85);
    }
}
