// ── Write planning ──
//
// Turns a zone's analysis into the provider writes that would converge
// it. Pure: nothing here talks to the network, so `plan` and `sync`
// render exactly the same operations.

use mxsync_api::DnsRecord;
use serde::Serialize;

use crate::convert::canonical_to_provider;
use crate::error::CoreError;
use crate::model::serialize_display;
use crate::model::{CanonicalRecord, Zone, ZoneReport};

/// What kind of write an operation performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteAction {
    /// Create a new provider record.
    Create,
    /// Overwrite the existing provider record `id`.
    Update { id: String },
}

/// One provider write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOperation {
    pub action: WriteAction,
    /// The desired record this write publishes.
    pub target: CanonicalRecord,
    /// The provider-native body sent with the request.
    pub payload: DnsRecord,
}

/// A desired record whose content cannot be expressed as a provider write.
#[derive(Debug, Serialize)]
pub struct RejectedWrite {
    pub target: CanonicalRecord,
    #[serde(serialize_with = "serialize_display")]
    pub error: CoreError,
}

/// Every write needed for one zone.
#[derive(Debug, Serialize)]
pub struct ZonePlan {
    pub zone: Zone,
    pub operations: Vec<WriteOperation>,
    pub rejected: Vec<RejectedWrite>,
}

impl ZonePlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.rejected.is_empty()
    }
}

/// Plan the writes for every unsynced result of `report`, in order.
///
/// A drifted record with a provider id becomes an update of that id;
/// everything else is a create.
pub fn plan_zone(report: &ZoneReport) -> ZonePlan {
    let mut operations = Vec::new();
    let mut rejected = Vec::new();

    for result in report.unsynced() {
        let payload = match canonical_to_provider(&result.target) {
            Ok(payload) => payload,
            Err(error) => {
                rejected.push(RejectedWrite {
                    target: result.target.clone(),
                    error,
                });
                continue;
            }
        };

        let action = match result.actual.as_ref().and_then(|a| a.id.clone()) {
            Some(id) => WriteAction::Update { id },
            None => WriteAction::Create,
        };

        operations.push(WriteOperation {
            action,
            target: result.target.clone(),
            payload,
        });
    }

    ZonePlan {
        zone: report.zone.clone(),
        operations,
        rejected,
    }
}
