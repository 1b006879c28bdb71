//! Overall-confidence aggregation.

use odonto_core::{Finding, clamp01, round2};

/// Overall confidence for a finding set.
///
/// An explicit finite document-level value wins, normalized like any
/// per-finding confidence. Otherwise the mean of the per-finding
/// confidences, rounded to two decimals. An empty set with no explicit
/// value has no overall confidence at all; `None` and `0.0` mean
/// different things to the portal.
pub fn aggregate(findings: &[Finding], explicit: Option<f64>) -> Option<f64> {
    if let Some(v) = explicit
        && v.is_finite()
    {
        return Some(round2(clamp01(v)));
    }
    if findings.is_empty() {
        return None;
    }
    let sum: f64 = findings.iter().map(|f| f.confidence).sum();
    Some(round2(sum / findings.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use odonto_core::Severity;

    fn finding(confidence: f64) -> Finding {
        Finding {
            tooth_fdi: 11,
            notes: vec![],
            severity: Severity::Low,
            confidence,
            image_index: 0,
            image_id: "img".into(),
            overlays: vec![],
        }
    }

    #[test]
    fn explicit_value_wins() {
        let set = vec![finding(0.2), finding(0.4)];
        assert_eq!(aggregate(&set, Some(0.91)), Some(0.91));
    }

    #[test]
    fn explicit_value_is_normalized() {
        assert_eq!(aggregate(&[], Some(1.5)), Some(1.0));
        assert_eq!(aggregate(&[], Some(-0.2)), Some(0.0));
        assert_eq!(aggregate(&[], Some(0.666)), Some(0.67));
    }

    #[test]
    fn non_finite_explicit_falls_back_to_mean() {
        let set = vec![finding(0.2), finding(0.4)];
        assert_eq!(aggregate(&set, Some(f64::NAN)), Some(0.3));
    }

    #[test]
    fn mean_of_findings() {
        let set = vec![finding(0.5), finding(0.7), finding(0.9)];
        assert_eq!(aggregate(&set, None), Some(0.7));
    }

    #[test]
    fn mean_rounds_to_two_decimals() {
        let set = vec![finding(0.5), finding(0.5), finding(0.6)];
        assert_eq!(aggregate(&set, None), Some(0.53));
    }

    #[test]
    fn empty_set_without_explicit_is_none() {
        assert_eq!(aggregate(&[], None), None);
    }
}
