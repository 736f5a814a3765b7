// ── Record adapters ──
//
// Normalizes provider wire records and mail-server records into
// `CanonicalRecord`, and turns canonical records back into provider
// payloads. Every managed type goes through the `RecordPayload` sum type
// so each side only has to agree on one structured shape.

use std::sync::LazyLock;

use mxsync_api::{DnsRecord, MailServerRecord, RecordData};
use regex::Regex;

use crate::error::CoreError;
use crate::model::{CanonicalRecord, RecordType};

/// The SPF `ra=<mailbox> ` report-address modifier the mail server embeds
/// in its SPF records. Greedy, so it runs to the last space on the line.
static REPORT_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ra=.+ ").expect("static regex is valid"));

/// Strip a single trailing root dot.
fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

// ── Structured payload ───────────────────────────────────────────────

/// Type-specific record data, one variant per managed record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPayload {
    A {
        address: String,
    },
    Aaaa {
        address: String,
    },
    Cname {
        target: String,
    },
    Mx {
        priority: u16,
        exchange: String,
    },
    Txt {
        text: String,
    },
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    Tlsa {
        usage: u8,
        selector: u8,
        matching_type: u8,
        certificate: String,
    },
}

impl RecordPayload {
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A { .. } => RecordType::A,
            Self::Aaaa { .. } => RecordType::Aaaa,
            Self::Cname { .. } => RecordType::Cname,
            Self::Mx { .. } => RecordType::Mx,
            Self::Txt { .. } => RecordType::Txt,
            Self::Srv { .. } => RecordType::Srv,
            Self::Tlsa { .. } => RecordType::Tlsa,
        }
    }

    /// Read the payload out of a provider wire record.
    pub fn from_wire(record: &DnsRecord) -> Result<Self, CoreError> {
        let record_type = RecordType::from_wire(&record.record_type)?;
        let name = record.name.as_str();
        let missing = |field: &str| CoreError::malformed(record_type, name, format!("missing {field}"));

        let content = || record.content.clone().ok_or_else(|| missing("content"));
        let data = || record.data.as_ref().ok_or_else(|| missing("data"));

        Ok(match record_type {
            RecordType::A => Self::A { address: content()? },
            RecordType::Aaaa => Self::Aaaa { address: content()? },
            RecordType::Cname => Self::Cname { target: content()? },
            RecordType::Txt => Self::Txt { text: content()? },
            RecordType::Mx => Self::Mx {
                priority: record.priority.ok_or_else(|| missing("priority"))?,
                exchange: content()?,
            },
            RecordType::Srv => {
                let data = data()?;
                Self::Srv {
                    priority: data.priority.ok_or_else(|| missing("data.priority"))?,
                    weight: data.weight.ok_or_else(|| missing("data.weight"))?,
                    port: data.port.ok_or_else(|| missing("data.port"))?,
                    target: data.target.clone().ok_or_else(|| missing("data.target"))?,
                }
            }
            RecordType::Tlsa => {
                let data = data()?;
                Self::Tlsa {
                    usage: data.usage.ok_or_else(|| missing("data.usage"))?,
                    selector: data.selector.ok_or_else(|| missing("data.selector"))?,
                    matching_type: data
                        .matching_type
                        .ok_or_else(|| missing("data.matching_type"))?,
                    certificate: data
                        .certificate
                        .clone()
                        .ok_or_else(|| missing("data.certificate"))?,
                }
            }
        })
    }

    /// Parse canonical content text for `record_type`.
    pub fn from_content(record_type: RecordType, name: &str, content: &str) -> Result<Self, CoreError> {
        let malformed = |reason: String| CoreError::malformed(record_type, name, reason);

        Ok(match record_type {
            RecordType::A => Self::A {
                address: strip_root(content).to_owned(),
            },
            RecordType::Aaaa => Self::Aaaa {
                address: strip_root(content).to_owned(),
            },
            RecordType::Cname => Self::Cname {
                target: strip_root(content).to_owned(),
            },
            RecordType::Txt => Self::Txt {
                text: content.to_owned(),
            },
            RecordType::Mx => {
                let Some((priority, exchange)) = content.split_once(' ') else {
                    return Err(malformed(format!("expected \"<priority> <exchange>\", got {content:?}")));
                };
                Self::Mx {
                    priority: parse_number(priority, "priority").map_err(malformed)?,
                    exchange: strip_root(exchange).to_owned(),
                }
            }
            RecordType::Srv => {
                let [priority, weight, port, target] = four_tokens(content).map_err(malformed)?;
                Self::Srv {
                    priority: parse_number(priority, "priority").map_err(malformed)?,
                    weight: parse_number(weight, "weight").map_err(malformed)?,
                    port: parse_number(port, "port").map_err(malformed)?,
                    target: strip_root(target).to_owned(),
                }
            }
            RecordType::Tlsa => {
                let [usage, selector, matching_type, certificate] =
                    four_tokens(content).map_err(malformed)?;
                Self::Tlsa {
                    usage: parse_number(usage, "usage").map_err(malformed)?,
                    selector: parse_number(selector, "selector").map_err(malformed)?,
                    matching_type: parse_number(matching_type, "matching type").map_err(malformed)?,
                    certificate: certificate.to_owned(),
                }
            }
        })
    }

    /// Render as canonical content text.
    pub fn to_content(&self) -> String {
        match self {
            Self::A { address } | Self::Aaaa { address } => format!("{address}."),
            Self::Cname { target } => format!("{target}."),
            Self::Txt { text } => text.clone(),
            Self::Mx { priority, exchange } => format!("{priority} {exchange}."),
            Self::Srv {
                priority,
                weight,
                port,
                target,
            } => format!("{priority} {weight} {port} {target}."),
            Self::Tlsa {
                usage,
                selector,
                matching_type,
                certificate,
            } => format!("{usage} {selector} {matching_type} {certificate}"),
        }
    }

    /// Build the provider wire record for `name`.
    pub fn into_wire(self, name: String) -> DnsRecord {
        let record_type = self.record_type().to_string();
        let mut record = DnsRecord {
            record_type,
            name,
            ..DnsRecord::default()
        };
        match self {
            Self::A { address } | Self::Aaaa { address } => record.content = Some(address),
            Self::Cname { target } => record.content = Some(target),
            Self::Txt { text } => record.content = Some(text),
            Self::Mx { priority, exchange } => {
                record.priority = Some(priority);
                record.content = Some(exchange);
            }
            Self::Srv {
                priority,
                weight,
                port,
                target,
            } => {
                record.data = Some(RecordData {
                    priority: Some(priority),
                    weight: Some(weight),
                    port: Some(port),
                    target: Some(target),
                    ..RecordData::default()
                });
            }
            Self::Tlsa {
                usage,
                selector,
                matching_type,
                certificate,
            } => {
                record.data = Some(RecordData {
                    usage: Some(usage),
                    selector: Some(selector),
                    matching_type: Some(matching_type),
                    certificate: Some(certificate),
                    ..RecordData::default()
                });
            }
        }
        record
    }
}

fn four_tokens(content: &str) -> Result<[&str; 4], String> {
    let tokens: Vec<&str> = content.split(' ').collect();
    <[&str; 4]>::try_from(tokens.as_slice())
        .map_err(|_| format!("expected 4 space-separated fields, got {}", tokens.len()))
}

fn parse_number<T: std::str::FromStr>(token: &str, field: &str) -> Result<T, String> {
    token
        .parse()
        .map_err(|_| format!("{field} {token:?} is not a valid number"))
}

// ── Adapters ─────────────────────────────────────────────────────────

/// Provider wire record → canonical record (keeps the provider id).
pub fn provider_to_canonical(record: &DnsRecord) -> Result<CanonicalRecord, CoreError> {
    let payload = RecordPayload::from_wire(record)?;
    Ok(CanonicalRecord {
        record_type: payload.record_type(),
        name: strip_root(&record.name).to_owned(),
        content: payload.to_content(),
        id: record.id.clone(),
    })
}

/// Canonical record → provider wire record.
///
/// The id is carried through; records planned for creation have none.
pub fn canonical_to_provider(record: &CanonicalRecord) -> Result<DnsRecord, CoreError> {
    let name = strip_root(&record.name);
    let payload = RecordPayload::from_content(record.record_type, name, &record.content)?;
    let mut wire = payload.into_wire(name.to_owned());
    wire.id.clone_from(&record.id);
    Ok(wire)
}

/// Mail-server record → canonical record.
///
/// Content is taken as already canonical apart from the reporting
/// address fragment, which is removed.
pub fn mail_server_to_canonical(record: &MailServerRecord) -> Result<CanonicalRecord, CoreError> {
    let record_type = RecordType::from_wire(&record.record_type)?;
    Ok(CanonicalRecord::new(
        record_type,
        strip_root(&record.name),
        REPORT_ADDRESS.replace_all(&record.content, ""),
    ))
}
