// ── Analysis results ──

use serde::Serialize;
use serde::ser::SerializeStruct;

use super::record::CanonicalRecord;
use super::zone::Zone;
use crate::error::CoreError;

/// Verdict for one mail-server-desired record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The provider already publishes the record.
    InSync,
    /// A loosely matched provider record exists with different content.
    Drifted,
    /// No provider record matches.
    Missing,
}

/// The verdict for one desired record against the provider zone.
///
/// `actual` is only ever set by a loose match that found a same-slot
/// provider record with different content; `sync` is then `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub target: CanonicalRecord,
    pub sync: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<CanonicalRecord>,
}

impl AnalysisResult {
    pub fn status(&self) -> SyncStatus {
        match (self.sync, &self.actual) {
            (true, _) => SyncStatus::InSync,
            (false, Some(_)) => SyncStatus::Drifted,
            (false, None) => SyncStatus::Missing,
        }
    }
}

/// All analysis results for one zone, in mail-server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneReport {
    pub zone: Zone,
    pub results: Vec<AnalysisResult>,
}

impl ZoneReport {
    pub fn in_sync(&self) -> usize {
        self.count(SyncStatus::InSync)
    }

    pub fn drifted(&self) -> usize {
        self.count(SyncStatus::Drifted)
    }

    pub fn missing(&self) -> usize {
        self.count(SyncStatus::Missing)
    }

    /// Whether every desired record is already published.
    pub fn is_converged(&self) -> bool {
        self.results.iter().all(|r| r.sync)
    }

    /// Results that still need a write.
    pub fn unsynced(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| !r.sync)
    }

    fn count(&self, status: SyncStatus) -> usize {
        self.results.iter().filter(|r| r.status() == status).count()
    }
}

/// The outcome of analyzing one configured zone.
///
/// Zones are analyzed independently; one zone's failure never hides
/// another zone's report.
#[derive(Debug)]
pub struct ZoneOutcome {
    pub zone_id: String,
    pub result: Result<ZoneReport, CoreError>,
}

impl Serialize for ZoneOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ZoneOutcome", 3)?;
        state.serialize_field("zone_id", &self.zone_id)?;
        match &self.result {
            Ok(report) => {
                state.serialize_field("report", report)?;
                state.skip_field("error")?;
            }
            Err(e) => {
                state.skip_field("report")?;
                state.serialize_field("error", &e.to_string())?;
            }
        }
        state.end()
    }
}
