// ── Provider zones ──

use serde::{Deserialize, Serialize};

/// A provider zone: opaque identifier plus apex domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

impl Zone {
    /// Whether `domain` lives in this zone: the apex itself or any
    /// name below it on a label boundary.
    pub fn contains_domain(&self, domain: &str) -> bool {
        let domain = domain.strip_suffix('.').unwrap_or(domain);
        let apex = self.name.strip_suffix('.').unwrap_or(&self.name);
        domain.eq_ignore_ascii_case(apex)
            || domain
                .len()
                .checked_sub(apex.len() + 1)
                .is_some_and(|cut| {
                    domain.as_bytes()[cut] == b'.' && domain[cut + 1..].eq_ignore_ascii_case(apex)
                })
    }
}

impl From<mxsync_api::Zone> for Zone {
    fn from(zone: mxsync_api::Zone) -> Self {
        Self {
            id: zone.id,
            name: zone.name,
        }
    }
}
