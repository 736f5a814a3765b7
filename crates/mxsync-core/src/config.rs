// ── Runtime sync configuration ──
//
// These types describe *what* to reconcile and *how* to reach both ends.
// They carry credential data and connection tuning, but never touch disk.
// The CLI constructs a `SyncConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use mxsync_api::{CloudflareAuth, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

/// How to authenticate with the DNS provider.
#[derive(Debug, Clone)]
pub enum ProviderCredentials {
    /// Scoped API token (preferred).
    ApiToken(SecretString),
    /// Account email plus global API key.
    GlobalKey { email: String, key: SecretString },
}

impl From<&ProviderCredentials> for CloudflareAuth {
    fn from(creds: &ProviderCredentials) -> Self {
        match creds {
            ProviderCredentials::ApiToken(token) => CloudflareAuth::ApiToken(token.clone()),
            ProviderCredentials::GlobalKey { email, key } => CloudflareAuth::GlobalKey {
                email: email.clone(),
                key: key.clone(),
            },
        }
    }
}

/// TLS verification strategy, applied to both remote ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed mail server certs).
    DangerAcceptInvalid,
}

/// Connection details for the DNS provider API.
#[derive(Debug, Clone)]
pub struct CloudflareSettings {
    /// API root (usually `https://api.cloudflare.com/client/v4/`).
    pub base_url: Url,
    pub auth: ProviderCredentials,
}

/// Connection details for the Stalwart management API.
#[derive(Debug, Clone)]
pub struct StalwartSettings {
    /// Instance root (e.g. `https://mail.example.com`).
    pub url: Url,
    /// Management API access token.
    pub token: SecretString,
}

/// Everything needed to run one reconciliation.
///
/// Built by the CLI, passed to `Reconciler` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Provider connection.
    pub cloudflare: CloudflareSettings,
    /// Mail server connection.
    pub stalwart: StalwartSettings,
    /// Provider zone identifiers to reconcile.
    pub zone_ids: Vec<String>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl SyncConfig {
    /// Transport settings shared by both HTTP clients.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
