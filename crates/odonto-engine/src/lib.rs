//! Finding reconciliation engine.
//!
//! Pure, synchronous, stateless transformations between raw generator
//! output and the canonical stored clinical payload: canonicalize →
//! merge → (diff | apply) → aggregate. Per-record noise degrades
//! silently per the alias/coercion rules; there is no error channel
//! below the document level.

pub mod alias;
pub mod apply;
pub mod canonical;
pub mod confidence;
pub mod diff;
pub mod error;
pub mod merge;
pub mod report;

pub use apply::{ChangeOp, FindingChange, apply};
pub use canonical::canonicalize;
pub use confidence::aggregate;
pub use diff::{DiffResult, NoteChange, NoteLine, NoteState, diff};
pub use error::ReconcileError;
pub use merge::merge;
pub use report::{ReportPayload, parse_changes, parse_document, reconcile_draft, reconcile_rebuttal};
