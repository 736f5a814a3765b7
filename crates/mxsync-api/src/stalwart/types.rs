//! Wire types for the Stalwart management API.
//!
//! Successful responses wrap their payload in `{ "data": ... }`; failures
//! carry `{ "error": "...", "details": "..." }`.

use serde::{Deserialize, Serialize};

/// `{ "data": T }` wrapper used by every management endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Paged listing, from `GET /api/domain`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemList<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Error body returned on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// A DNS record the mail server expects to be published for a domain,
/// from `GET /api/domain/{domain}`.
///
/// Names are FQDN-anchored (trailing `.`); SPF content may embed an inline
/// `ra=<mailbox>` report-address modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailServerRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
}
