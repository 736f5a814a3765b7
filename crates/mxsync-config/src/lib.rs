//! Shared configuration for mxsync.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `mxsync_core::SyncConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mxsync_core::{
    CloudflareSettings, ProviderCredentials, StalwartSettings, SyncConfig, TlsVerification,
};

/// Keyring service name every secret is stored under.
pub const KEYRING_SERVICE: &str = "mxsync";

/// Request timeout when neither the profile nor the defaults set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {secret} configured for profile '{profile}'")]
    NoCredentials {
        profile: String,
        secret: &'static str,
    },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// A named profile: one provider account, one mail server, its zones.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Provider zone identifiers to reconcile.
    #[serde(default)]
    pub zones: Vec<String>,

    /// Provider auth mode: "token" or "global-key".
    #[serde(default = "default_cloudflare_auth")]
    pub cloudflare_auth: String,

    /// Account email (global-key auth only).
    pub cloudflare_email: Option<String>,

    /// API token (plaintext, prefer keyring or env var).
    pub cloudflare_token: Option<String>,

    /// Environment variable name containing the API token.
    pub cloudflare_token_env: Option<String>,

    /// Global API key (plaintext, prefer keyring or env var).
    pub cloudflare_key: Option<String>,

    /// Environment variable name containing the global API key.
    pub cloudflare_key_env: Option<String>,

    /// Override the provider API root.
    pub cloudflare_api_url: Option<String>,

    /// Mail server base URL (e.g., "https://mail.example.com").
    #[serde(default)]
    pub stalwart_url: String,

    /// Management API token (plaintext, prefer keyring or env var).
    pub stalwart_token: Option<String>,

    /// Environment variable name containing the management API token.
    pub stalwart_token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

fn default_cloudflare_auth() -> String {
    "token".into()
}

// ── Secrets ─────────────────────────────────────────────────────────

/// The secrets a profile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secret {
    CloudflareToken,
    CloudflareKey,
    StalwartToken,
}

impl Secret {
    pub const ALL: [Self; 3] = [Self::CloudflareToken, Self::CloudflareKey, Self::StalwartToken];

    /// Stable name used for keyring entries and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::CloudflareToken => "cloudflare-token",
            Self::CloudflareKey => "cloudflare-key",
            Self::StalwartToken => "stalwart-token",
        }
    }

    fn env_var(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::CloudflareToken => profile.cloudflare_token_env.as_deref(),
            Self::CloudflareKey => profile.cloudflare_key_env.as_deref(),
            Self::StalwartToken => profile.stalwart_token_env.as_deref(),
        }
    }

    fn plaintext(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::CloudflareToken => profile.cloudflare_token.as_deref(),
            Self::CloudflareKey => profile.cloudflare_key.as_deref(),
            Self::StalwartToken => profile.stalwart_token.as_deref(),
        }
    }
}

fn keyring_entry(profile_name: &str, secret: Secret) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{}", secret.name()))
}

/// Store a secret in the system keyring.
pub fn store_secret(profile_name: &str, secret: Secret, value: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, secret)?.set_password(value)?;
    Ok(())
}

/// Resolve a secret from the credential chain:
/// named env var, then keyring, then plaintext in the file.
pub fn resolve_secret(
    profile: &Profile,
    profile_name: &str,
    secret: Secret,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's *_env → env var lookup
    if let Some(env_name) = secret.env_var(profile) {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name, secret) {
        if let Ok(val) = entry.get_password() {
            return Ok(SecretString::from(val));
        }
    }

    // 3. Plaintext in config
    if let Some(val) = secret.plaintext(profile) {
        return Ok(SecretString::from(val.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        secret: secret.name(),
    })
}

/// Resolve provider credentials from the profile's `cloudflare_auth` mode.
pub fn resolve_provider_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<ProviderCredentials, ConfigError> {
    match profile.cloudflare_auth.as_str() {
        "token" => Ok(ProviderCredentials::ApiToken(resolve_secret(
            profile,
            profile_name,
            Secret::CloudflareToken,
        )?)),
        "global-key" => {
            let email =
                profile
                    .cloudflare_email
                    .clone()
                    .ok_or_else(|| ConfigError::Validation {
                        field: "cloudflare_email".into(),
                        reason: "required when cloudflare_auth is 'global-key'".into(),
                    })?;
            let key = resolve_secret(profile, profile_name, Secret::CloudflareKey)?;
            Ok(ProviderCredentials::GlobalKey { email, key })
        }
        other => Err(ConfigError::Validation {
            field: "cloudflare_auth".into(),
            reason: format!("expected 'token' or 'global-key', got '{other}'"),
        }),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "mxsync", "mxsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mxsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + `MXSYNC_`-prefixed environment.
///
/// Nested keys use a double underscore (`MXSYNC_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MXSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `SyncConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_sync_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<SyncConfig, ConfigError> {
    if profile.stalwart_url.is_empty() {
        return Err(ConfigError::Validation {
            field: "stalwart_url".into(),
            reason: "not set".into(),
        });
    }
    let stalwart_url = parse_url("stalwart_url", &profile.stalwart_url)?;
    let cloudflare_url = parse_url(
        "cloudflare_api_url",
        profile
            .cloudflare_api_url
            .as_deref()
            .unwrap_or(mxsync_api::cloudflare::DEFAULT_BASE_URL),
    )?;

    let auth = resolve_provider_credentials(profile, profile_name)?;
    let token = resolve_secret(profile, profile_name, Secret::StalwartToken)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));

    Ok(SyncConfig {
        cloudflare: CloudflareSettings {
            base_url: cloudflare_url,
            auth,
        },
        stalwart: StalwartSettings {
            url: stalwart_url,
            token,
        },
        zone_ids: profile.zones.clone(),
        tls,
        timeout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
timeout = 10

[profiles.home]
zones = ["023e105f4ecef8ad9ca31a8372d0c353"]
cloudflare_token = "cf-plain"
stalwart_url = "https://mail.example.com"
stalwart_token_env = "MXSYNC_TEST_STALWART_TOKEN"
stalwart_token = "stalwart-plain"

[profiles.legacy]
cloudflare_auth = "global-key"
cloudflare_email = "admin@example.com"
cloudflare_key = "global"
stalwart_url = "https://mail.example.org"
stalwart_token = "t"
insecure = true
"#;

    fn sample() -> Config {
        toml::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn parses_profiles_and_defaults() {
        let config = sample();
        assert_eq!(config.active_profile_name(), "home");
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.defaults.output, "table");

        let home = config.profile("home").unwrap();
        assert_eq!(home.cloudflare_auth, "token");
        assert_eq!(home.zones.len(), 1);

        assert!(matches!(
            config.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn env_var_wins_over_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("MXSYNC_TEST_STALWART_TOKEN", "from-env");
            let config = sample();
            let home = config.profile("home").map_err(|e| e.to_string())?;
            let token = resolve_secret(home, "mxsync-test-home", Secret::StalwartToken)
                .map_err(|e| e.to_string())?;
            assert_eq!(token.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn plaintext_is_the_last_resort() {
        Jail::expect_with(|_jail| {
            let config = sample();
            let home = config.profile("home").map_err(|e| e.to_string())?;
            let token = resolve_secret(home, "mxsync-test-home", Secret::StalwartToken)
                .map_err(|e| e.to_string())?;
            assert_eq!(token.expose_secret(), "stalwart-plain");
            Ok(())
        });
    }

    #[test]
    fn missing_secret_is_reported() {
        let profile = Profile::default();
        match resolve_secret(&profile, "mxsync-test-empty", Secret::CloudflareToken) {
            Err(ConfigError::NoCredentials { profile, secret }) => {
                assert_eq!(profile, "mxsync-test-empty");
                assert_eq!(secret, "cloudflare-token");
            }
            other => panic!("expected NoCredentials, got {other:?}"),
        }
    }

    #[test]
    fn global_key_requires_email() {
        let profile = Profile {
            cloudflare_auth: "global-key".into(),
            cloudflare_key: Some("k".into()),
            ..Profile::default()
        };
        assert!(matches!(
            resolve_provider_credentials(&profile, "mxsync-test-gk"),
            Err(ConfigError::Validation { ref field, .. }) if field == "cloudflare_email"
        ));
    }

    #[test]
    fn unknown_auth_mode_is_rejected() {
        let profile = Profile {
            cloudflare_auth: "oauth".into(),
            ..Profile::default()
        };
        assert!(matches!(
            resolve_provider_credentials(&profile, "mxsync-test-oauth"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn profile_translates_to_sync_config() {
        let config = sample();
        let legacy = config.profile("legacy").unwrap();
        let sync = profile_to_sync_config(legacy, "mxsync-test-legacy").unwrap();

        assert_eq!(sync.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(sync.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(sync.stalwart.url.as_str(), "https://mail.example.org/");
        assert_eq!(
            sync.cloudflare.base_url.as_str(),
            mxsync_api::cloudflare::DEFAULT_BASE_URL
        );
        assert!(matches!(
            sync.cloudflare.auth,
            ProviderCredentials::GlobalKey { ref email, .. } if email == "admin@example.com"
        ));
    }

    #[test]
    fn missing_stalwart_url_is_invalid() {
        let profile = Profile {
            cloudflare_token: Some("t".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_sync_config(&profile, "mxsync-test-nourl"),
            Err(ConfigError::Validation { ref field, .. }) if field == "stalwart_url"
        ));
    }

    #[test]
    fn secret_names_match_keyring_entries() {
        let names: Vec<&str> = Secret::ALL.into_iter().map(Secret::name).collect();
        assert_eq!(names, ["cloudflare-token", "cloudflare-key", "stalwart-token"]);
    }

    #[test]
    fn save_then_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Jail::expect_with(|_jail| {
            let original = sample();
            save_config_to(&original, &path).map_err(|e| e.to_string())?;
            let loaded = load_config_from(&path).map_err(|e| e.to_string())?;
            assert_eq!(loaded.default_profile.as_deref(), Some("home"));
            assert_eq!(loaded.profiles.len(), 2);
            assert_eq!(loaded.defaults.timeout, 10);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("MXSYNC_DEFAULTS__TIMEOUT", "99");
            jail.set_env("MXSYNC_DEFAULT_PROFILE", "legacy");
            let loaded =
                load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(loaded.defaults.timeout, 99);
            assert_eq!(loaded.active_profile_name(), "legacy");
            Ok(())
        });
    }
}
