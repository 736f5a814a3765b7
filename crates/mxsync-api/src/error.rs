use thiserror::Error;

/// Top-level error type for the `mxsync-api` crate.
///
/// Covers every failure mode of both collaborators: authentication,
/// transport, the Cloudflare envelope, and the Stalwart management API.
/// `mxsync-core` maps these into domain-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A credential could not be encoded as an HTTP header value.
    #[error("Invalid credential header value for {header}")]
    InvalidCredentialHeader { header: &'static str },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Rate limited by the remote API. Includes retry-after in seconds.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── Cloudflare ──────────────────────────────────────────────────
    /// Structured error from the `{success, errors: [...]}` envelope.
    #[error("Cloudflare API error (HTTP {status}): {message}")]
    Cloudflare {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    // ── Stalwart ────────────────────────────────────────────────────
    /// Error from the Stalwart management API.
    #[error("Stalwart API error (HTTP {status}): {message}")]
    Stalwart { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Cloudflare { status, .. } | Self::Stalwart { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Cloudflare { status: 404, .. } | Self::Stalwart { status: 404, .. } => true,
            _ => false,
        }
    }
}
