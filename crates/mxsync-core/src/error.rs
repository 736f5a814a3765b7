// ── Core error types ──
//
// User-facing errors from mxsync-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<mxsync_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

use crate::model::RecordType;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Record adaptation ────────────────────────────────────────────
    #[error("Unsupported record type: {record_type}")]
    UnsupportedRecordType { record_type: String },

    #[error("Malformed {record_type} record {name}: {reason}")]
    MalformedContent {
        record_type: RecordType,
        name: String,
        reason: String,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Zone not found: {zone_id}")]
    ZoneNotFound { zone_id: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Provider-specific error code (e.g. Cloudflare's `81057`).
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a `MalformedContent` error.
    pub(crate) fn malformed(
        record_type: RecordType,
        name: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedContent {
            record_type,
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<mxsync_api::Error> for CoreError {
    fn from(err: mxsync_api::Error) -> Self {
        match err {
            mxsync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            mxsync_api::Error::InvalidCredentialHeader { header } => CoreError::Config {
                message: format!("credential is not a valid {header} header value"),
            },
            mxsync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            mxsync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            mxsync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            mxsync_api::Error::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            mxsync_api::Error::Cloudflare {
                status,
                code,
                message,
            } => CoreError::Api {
                message,
                code: code.map(|c| c.to_string()),
                status: Some(status),
            },
            mxsync_api::Error::Stalwart { status, message } => CoreError::Api {
                message,
                code: None,
                status: Some(status),
            },
            mxsync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
