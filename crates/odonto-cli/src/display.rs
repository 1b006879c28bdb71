//! Plain-text rendering of finding sets and diffs.
//!
//! The JSON payload is the machine interface; these renderings exist
//! for eyeballing a reconciliation run from a terminal.

use std::fmt::Write;

use odonto_core::Finding;
use odonto_engine::{DiffResult, ReportPayload};

// ── Report card ──

pub fn render_report(payload: &ReportPayload) -> String {
    let mut out = String::new();
    match payload.overall_confidence {
        Some(c) => {
            let _ = writeln!(out, "overall confidence: {c:.2}");
        }
        None => {
            let _ = writeln!(out, "overall confidence: n/a");
        }
    }
    let _ = writeln!(out, "findings: {}", payload.findings.len());
    for finding in &payload.findings {
        let _ = writeln!(out, "{}", render_finding(finding));
    }
    out
}

fn render_finding(finding: &Finding) -> String {
    let notes = if finding.notes.is_empty() {
        "(no notes)".to_string()
    } else {
        finding.notes.join("; ")
    };
    let mut line = format!(
        "  tooth {:>2}  [{:<8}]  conf {:.2}  {notes}",
        finding.tooth_fdi,
        finding.severity.as_str(),
        finding.confidence,
    );
    if !finding.overlays.is_empty() {
        let _ = write!(line, "  ({} overlay(s))", finding.overlays.len());
    }
    line
}

// ── Diff listing ──

pub fn render_diff(diff: &DiffResult) -> String {
    if diff.is_empty() {
        return "no changes\n".to_string();
    }
    let mut out = String::new();
    for line in &diff.removed {
        let _ = writeln!(out, "- tooth {:>2} [{}] {}", line.tooth, line.severity, line.note);
    }
    for change in &diff.modified {
        let _ = writeln!(
            out,
            "~ tooth {:>2} [{} -> {}] {} -> {}",
            change.tooth,
            change.before.severity,
            change.after.severity,
            change.before.note,
            change.after.note,
        );
    }
    for line in &diff.added {
        let _ = writeln!(out, "+ tooth {:>2} [{}] {}", line.tooth, line.severity, line.note);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use odonto_core::Severity;
    use odonto_engine::diff;

    fn finding(tooth: u8, notes: &[&str], severity: Severity) -> Finding {
        Finding {
            tooth_fdi: tooth,
            notes: notes.iter().map(|s| s.to_string()).collect(),
            severity,
            confidence: 0.5,
            image_index: 0,
            image_id: "img".into(),
            overlays: vec![],
        }
    }

    #[test]
    fn report_card_lists_each_tooth() {
        let payload = ReportPayload {
            findings: vec![
                finding(11, &["chip"], Severity::Low),
                finding(36, &["caries", "wear"], Severity::High),
            ],
            overall_confidence: Some(0.5),
        };
        let text = render_report(&payload);
        assert!(text.contains("overall confidence: 0.50"));
        assert!(text.contains("tooth 11"));
        assert!(text.contains("caries; wear"));
    }

    #[test]
    fn empty_diff_renders_no_changes() {
        let set = vec![finding(11, &["chip"], Severity::Low)];
        assert_eq!(render_diff(&diff(&set, &set)), "no changes\n");
    }

    #[test]
    fn diff_lines_carry_direction_markers() {
        let before = vec![finding(11, &["chip"], Severity::Low)];
        let after = vec![finding(36, &["caries"], Severity::High)];
        let text = render_diff(&diff(&before, &after));
        assert!(text.contains("- tooth 11"));
        assert!(text.contains("+ tooth 36"));
    }
}
