// ── Record matching ──
//
// Decides, for one desired record, whether the provider already publishes
// it. Records the mail server may legitimately rotate (DKIM keys, policy
// TXT records, CNAMEs) are matched on owner name and type only so drift
// is reported as an update of the existing record rather than a
// duplicate.

use tracing::warn;

use crate::model::{AnalysisResult, CanonicalRecord, RecordType};

/// Name fragments that mark a TXT record as a single-valued policy slot.
const LOOSE_TXT_LABELS: [&str; 4] = ["_domainkey", "_mta-sts", "_dmarc", "_tls"];

/// How a desired record is looked up among provider records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Same name and type; content may differ.
    Loose,
    /// Same name, type, and content.
    Strict,
}

impl MatchPolicy {
    pub fn for_record(record: &CanonicalRecord) -> Self {
        let loose = match record.record_type {
            RecordType::Cname => true,
            RecordType::Txt => {
                let name = record.name.to_ascii_lowercase();
                LOOSE_TXT_LABELS.iter().any(|label| name.contains(label))
                    || record.content.starts_with("v=spf1")
            }
            _ => false,
        };
        if loose { Self::Loose } else { Self::Strict }
    }
}

/// Match one desired record against the provider's records for the zone.
pub fn match_record(target: &CanonicalRecord, provider: &[CanonicalRecord]) -> AnalysisResult {
    match MatchPolicy::for_record(target) {
        MatchPolicy::Loose => {
            let mut candidates = provider.iter().filter(|r| r.same_slot(target));
            let found = candidates.next();
            let extra = candidates.count();
            if extra > 0 {
                warn!(
                    name = %target.name,
                    record_type = %target.record_type,
                    candidates = extra + 1,
                    "several provider records share a loosely matched slot; comparing the first"
                );
            }

            let sync = found.is_some_and(|r| r.content == target.content);
            AnalysisResult {
                target: target.clone(),
                sync,
                actual: if sync { None } else { found.cloned() },
            }
        }
        MatchPolicy::Strict => AnalysisResult {
            target: target.clone(),
            sync: provider.iter().any(|r| r.same_record(target)),
            actual: None,
        },
    }
}

/// Match every desired record, preserving mail-server order.
pub fn match_all(targets: &[CanonicalRecord], provider: &[CanonicalRecord]) -> Vec<AnalysisResult> {
    targets.iter().map(|t| match_record(t, provider)).collect()
}
