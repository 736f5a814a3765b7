// ── Canonical record types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::CoreError;

/// The closed set of record types mxsync manages.
///
/// Anything else a zone or mail server reports is rejected with
/// `CoreError::UnsupportedRecordType` rather than passed through.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Srv,
    Tlsa,
}

impl RecordType {
    /// Parse a wire-level type string (`"MX"`, `"TLSA"`, ...).
    pub fn from_wire(raw: &str) -> Result<Self, CoreError> {
        raw.parse().map_err(|_| CoreError::UnsupportedRecordType {
            record_type: raw.to_owned(),
        })
    }
}

/// A DNS record in the zone-file-like textual form both ends normalize to.
///
/// `name` never carries a trailing root dot. `content` follows the
/// per-type rendering in [`crate::convert`]. `id` is only known for
/// records read from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl CanonicalRecord {
    pub fn new(record_type: RecordType, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            record_type,
            name: name.into(),
            content: content.into(),
            id: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Same owner name and type. Owner names compare ASCII
    /// case-insensitively, as DNS names do.
    pub fn same_slot(&self, other: &Self) -> bool {
        self.record_type == other.record_type && self.name.eq_ignore_ascii_case(&other.name)
    }

    /// Same owner name, type, and content (ids are ignored).
    pub fn same_record(&self, other: &Self) -> bool {
        self.same_slot(other) && self.content == other.content
    }
}
