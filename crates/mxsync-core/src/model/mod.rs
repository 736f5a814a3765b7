// ── Domain model ──
//
// The canonical record shape both remote ends are normalized into, plus
// the per-zone analysis and convergence reports built on top of it.

pub mod analysis;
pub mod convergence;
pub mod record;
pub mod zone;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use mxsync_core::model::*` gives you everything.

pub use analysis::{AnalysisResult, SyncStatus, ZoneOutcome, ZoneReport};
pub use convergence::{AppliedWrite, ConvergeReport, WriteFailure};
pub use record::{CanonicalRecord, RecordType};
pub use zone::Zone;

/// Serialize any `Display` value (errors, mostly) as its message.
pub(crate) fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: serde::Serializer,
{
    serializer.collect_str(value)
}
