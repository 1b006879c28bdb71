//! Version diff engine.
//!
//! Diffs operate over flattened `(tooth, note, severity)` lines, not
//! whole findings — one finding with N notes is N lines — which is
//! how the feedback panel renders line-level changes.
//!
//! Matching order:
//! 1. lines identical on (tooth, lowercased note, severity) are
//!    unchanged and leave consideration on both sides;
//! 2. a leftover before-line takes the first leftover after-line on
//!    the same tooth with a different severity as its "modified"
//!    counterpart (severity transition);
//! 3. what remains is removed (before side) or added (after side).
//!
//! Step 2 is a deliberate first-candidate-wins heuristic: a tooth
//! carrying several changed notes can classify a removed+added pair
//! as modified. Known limitation, kept for parity with how the
//! feedback panel has always presented these.

use serde::Serialize;

use odonto_core::{Finding, Severity};

/// One flattened note line of a finding set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteLine {
    pub tooth: u8,
    pub note: String,
    pub severity: Severity,
}

/// A note whose severity (and possibly text) changed between versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteChange {
    pub tooth: u8,
    pub before: NoteState,
    pub after: NoteState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteState {
    pub note: String,
    pub severity: Severity,
}

/// Derived, never persisted; recomputed on demand from two sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffResult {
    pub added: Vec<NoteLine>,
    pub removed: Vec<NoteLine>,
    pub modified: Vec<NoteChange>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Diff two finding sets (e.g. draft vs. latest).
pub fn diff(before: &[Finding], after: &[Finding]) -> DiffResult {
    let before_lines = flatten(before);
    let mut after_lines: Vec<(NoteLine, bool)> =
        flatten(after).into_iter().map(|l| (l, false)).collect();

    let mut result = DiffResult::default();
    let mut leftover: Vec<NoteLine> = Vec::new();

    for line in before_lines {
        let exact = after_lines.iter_mut().find(|(a, consumed)| {
            !*consumed
                && a.tooth == line.tooth
                && a.severity == line.severity
                && note_key(&a.note) == note_key(&line.note)
        });
        match exact {
            Some((_, consumed)) => *consumed = true,
            None => leftover.push(line),
        }
    }

    for line in leftover {
        let fallback = after_lines
            .iter_mut()
            .find(|(a, consumed)| !*consumed && a.tooth == line.tooth && a.severity != line.severity);
        match fallback {
            Some((a, consumed)) => {
                *consumed = true;
                result.modified.push(NoteChange {
                    tooth: line.tooth,
                    before: NoteState { note: line.note, severity: line.severity },
                    after: NoteState { note: a.note.clone(), severity: a.severity },
                });
            }
            None => result.removed.push(line),
        }
    }

    for (line, consumed) in after_lines {
        if !consumed {
            result.added.push(line);
        }
    }

    result
}

fn flatten(findings: &[Finding]) -> Vec<NoteLine> {
    findings
        .iter()
        .flat_map(|f| {
            f.notes.iter().map(|note| NoteLine {
                tooth: f.tooth_fdi,
                note: note.clone(),
                severity: f.severity,
            })
        })
        .collect()
}

fn note_key(note: &str) -> String {
    note.trim().to_lowercase()
}
