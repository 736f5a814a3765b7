//! CLI configuration: thin wrapper around `mxsync_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` overrides (--config, --profile, --zone, --output, --insecure,
//! --timeout).

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use mxsync_core::{SyncConfig, TlsVerification};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use mxsync_config::{Config, Defaults, Profile, Secret, save_config_to};

/// Config file location: `--config` / `MXSYNC_CONFIG`, else the platform path.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(mxsync_config::config_path)
}

/// Load the config file, or an empty config when none exists yet.
pub fn load_config_or_default(global: &GlobalOpts) -> Config {
    mxsync_config::load_config_from(&config_path(global)).unwrap_or_default()
}

/// Output format: `--output` / `MXSYNC_OUTPUT`, else `[defaults] output`,
/// else table.
///
/// An unreadable config falls back to table here; the command that needs
/// the config reports the load error itself.
pub fn resolve_output(global: &GlobalOpts) -> OutputFormat {
    if let Some(format) = &global.output_flag {
        return format.clone();
    }
    let path = config_path(global);
    if !path.exists() {
        return OutputFormat::Table;
    }
    let Ok(cfg) = mxsync_config::load_config_from(&path) else {
        return OutputFormat::Table;
    };
    parse_output(&cfg.defaults.output).unwrap_or_else(|| {
        tracing::warn!(value = %cfg.defaults.output, "ignoring unknown defaults.output");
        OutputFormat::Table
    })
}

/// Parse an output format name as accepted by `--output`.
pub fn parse_output(value: &str) -> Option<OutputFormat> {
    OutputFormat::from_str(value, true).ok()
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Comma-separated, sorted profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

/// Build the runtime `SyncConfig` for the active profile.
///
/// Flag overrides win over the profile, which wins over `[defaults]`.
pub fn resolve_sync_config(global: &GlobalOpts) -> Result<SyncConfig, CliError> {
    let path = config_path(global);
    if !path.exists() {
        return Err(CliError::NoConfig {
            path: path.display().to_string(),
        });
    }
    let cfg = mxsync_config::load_config_from(&path)?;
    let profile_name = active_profile_name(global, &cfg);
    let profile = cfg
        .profiles
        .get(&profile_name)
        .ok_or_else(|| CliError::ProfileNotFound {
            name: profile_name.clone(),
            available: available_profiles(&cfg),
        })?;

    let mut sync = mxsync_config::profile_to_sync_config(profile, &profile_name)?;

    // 1. Zones (flag > profile)
    if !global.zones.is_empty() {
        sync.zone_ids.clone_from(&global.zones);
    }
    if sync.zone_ids.is_empty() {
        return Err(CliError::NoZones {
            profile: profile_name,
        });
    }

    // 2. TLS (flag or [defaults] can only loosen)
    if global.insecure || cfg.defaults.insecure {
        sync.tls = TlsVerification::DangerAcceptInvalid;
    }

    // 3. Timeout (flag > profile > defaults)
    let secs = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);
    sync.timeout = Duration::from_secs(secs);

    Ok(sync)
}
