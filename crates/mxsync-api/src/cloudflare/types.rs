//! Wire types for the Cloudflare v4 API.
//!
//! Every response is wrapped in the `{ success, errors, messages, result,
//! result_info }` envelope. DNS records keep `type` as an open string so a
//! zone containing record types mxsync does not manage still decodes.

use serde::{Deserialize, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// The `{ success, errors, result, result_info }` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
    pub result_info: Option<ResultInfo>,
}

/// One entry of the envelope's `errors` (or `messages`) array.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub page: u32,
    pub per_page: u32,
    pub count: u32,
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// One page of a list endpoint, envelope stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: ResultInfo,
}

impl<T> Page<T> {
    /// Whether another page follows this one.
    ///
    /// Stops at the last reported page, or early on a short page.
    pub fn has_more(&self) -> bool {
        let total_pages = self.info.total_pages.unwrap_or_else(|| {
            if self.info.per_page == 0 {
                0
            } else {
                self.info.total_count.div_ceil(self.info.per_page)
            }
        });
        let per_page = usize::try_from(self.info.per_page).unwrap_or(usize::MAX);
        self.info.page < total_pages && !self.items.is_empty() && self.items.len() >= per_page
    }
}

// ── Zones ────────────────────────────────────────────────────────────

/// Zone details, from `GET /zones/{zone_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ── DNS records ──────────────────────────────────────────────────────

/// A provider-native DNS record, as read from and written to
/// `/zones/{zone_id}/dns_records`.
///
/// MX carries a separate `priority`; SRV and TLSA carry a nested `data`
/// object; everything else carries a flat `content` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RecordData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

/// Structured payload for SRV and TLSA records.
///
/// Cloudflare uses one `data` key for every structured type; only the
/// fields relevant to the record's type are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordData {
    // SRV
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    // TLSA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_type: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}
