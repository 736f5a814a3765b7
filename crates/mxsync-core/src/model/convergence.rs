// ── Convergence reports ──

use serde::Serialize;

use super::record::CanonicalRecord;
use super::serialize_display;
use super::zone::Zone;
use crate::error::CoreError;
use crate::planner::WriteAction;

/// A provider write that succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedWrite {
    pub zone: Zone,
    pub action: WriteAction,
    pub target: CanonicalRecord,
    /// Identifier of the record as the provider now holds it.
    pub record_id: Option<String>,
}

/// A desired record that could not be written.
///
/// `action` is `None` when the record was rejected before any request
/// was made (its content could not be turned into a provider payload).
#[derive(Debug, Serialize)]
pub struct WriteFailure {
    pub zone: Zone,
    pub action: Option<WriteAction>,
    pub target: CanonicalRecord,
    #[serde(serialize_with = "serialize_display")]
    pub error: CoreError,
}

/// Everything a convergence pass did.
#[derive(Debug, Default, Serialize)]
pub struct ConvergeReport {
    pub applied: Vec<AppliedWrite>,
    pub failed: Vec<WriteFailure>,
}

impl ConvergeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn created(&self) -> usize {
        self.applied
            .iter()
            .filter(|w| matches!(w.action, WriteAction::Create))
            .count()
    }

    pub fn updated(&self) -> usize {
        self.applied
            .iter()
            .filter(|w| matches!(w.action, WriteAction::Update { .. }))
            .count()
    }
}
