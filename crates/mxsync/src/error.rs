//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use mxsync_config::ConfigError;
use mxsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INCOMPLETE: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(mxsync::connection_failed),
        help(
            "Check that the mail server and the DNS provider API are reachable.\n\
             For a self-signed mail server certificate, use --insecure (-k) \
             or set ca_cert in your profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(mxsync::timeout),
        help("Increase the timeout with --timeout or check the remote end's responsiveness.")
    )]
    Timeout,

    #[error("Rate limited by the remote API")]
    #[diagnostic(code(mxsync::rate_limited), help("Retry in {retry_after_secs}s."))]
    RateLimited { retry_after_secs: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(mxsync::auth_failed),
        help(
            "Verify the Cloudflare token (Zone:DNS:Edit permission) and the \
             Stalwart management token.\n\
             Run: mxsync config set-secret <secret>"
        )
    )]
    AuthFailed { message: String },

    #[error("No {secret} configured for profile '{profile}'")]
    #[diagnostic(
        code(mxsync::no_credentials),
        help(
            "Store it with: mxsync config set-secret {secret} --profile {profile}\n\
             Or name an environment variable with the profile's *_env key."
        )
    )]
    NoCredentials { profile: String, secret: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Zone '{zone_id}' not found")]
    #[diagnostic(
        code(mxsync::zone_not_found),
        help("Zone ids are the 32-character identifiers on the Cloudflare zone overview page.")
    )]
    ZoneNotFound { zone_id: String },

    // ── Records ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(mxsync::record_rejected),
        help("mxsync only manages A, AAAA, CNAME, MX, TXT, SRV, and TLSA records.")
    )]
    RecordRejected { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(mxsync::api_error))]
    ApiError { code: String, message: String },

    // ── Partial failure ──────────────────────────────────────────────
    #[error("{failed_zones} zone(s) could not be analyzed")]
    #[diagnostic(
        code(mxsync::analysis_incomplete),
        help("The other zones were processed; see the errors above. Re-run with -v for details.")
    )]
    AnalysisIncomplete { failed_zones: usize },

    #[error("Sync incomplete: {failed_zones} zone(s) failed analysis, {failed_writes} write(s) failed")]
    #[diagnostic(
        code(mxsync::sync_incomplete),
        help("Successful writes were kept. Re-run `mxsync sync` to retry the rest.")
    )]
    SyncIncomplete {
        failed_zones: usize,
        failed_writes: usize,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mxsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(mxsync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: mxsync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(mxsync::no_config),
        help(
            "Create one with: mxsync config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("No zones configured for profile '{profile}'")]
    #[diagnostic(
        code(mxsync::no_zones),
        help("Pass --zone <ZONE_ID> or run: mxsync config set zones <id>[,<id>...]")
    )]
    NoZones { profile: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(mxsync::config))]
    Config { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(mxsync::keyring),
        help("Store the secret in the config file or an environment variable instead.")
    )]
    Keyring { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(mxsync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ZoneNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout | Self::RateLimited { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::AnalysisIncomplete { .. } | Self::SyncIncomplete { .. } => exit_code::INCOMPLETE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::RateLimited { retry_after_secs } => {
                CliError::RateLimited { retry_after_secs }
            }
            CoreError::ZoneNotFound { zone_id } => CliError::ZoneNotFound { zone_id },
            e @ (CoreError::UnsupportedRecordType { .. } | CoreError::MalformedContent { .. }) => {
                CliError::RecordRejected {
                    message: e.to_string(),
                }
            }
            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| format!("HTTP {s}")))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile, secret } => CliError::NoCredentials {
                profile,
                secret: secret.into(),
            },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => {
                CliError::Config {
                    message: other.to_string(),
                }
            }
        }
    }
}
