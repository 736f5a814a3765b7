//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretKind};
use crate::config::{self, Config, Defaults, Profile, Secret};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

const VALID_KEYS: &str = "zones, cloudflare_auth, cloudflare_email, cloudflare_token, \
    cloudflare_token_env, cloudflare_key, cloudflare_key_env, cloudflare_api_url, \
    stalwart_url, stalwart_token, stalwart_token_env, ca_cert, insecure, timeout, \
    defaults.output, defaults.insecure, defaults.timeout";

// ── Helpers ─────────────────────────────────────────────────────────

impl From<SecretKind> for Secret {
    fn from(kind: SecretKind) -> Self {
        match kind {
            SecretKind::CloudflareToken => Self::CloudflareToken,
            SecretKind::CloudflareKey => Self::CloudflareKey,
            SecretKind::StalwartToken => Self::StalwartToken,
        }
    }
}

/// Replace every plaintext secret with a mask.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        for secret in [
            &mut profile.cloudflare_token,
            &mut profile.cloudflare_key,
            &mut profile.stalwart_token,
        ] {
            if secret.is_some() {
                *secret = Some(MASK.into());
            }
        }
    }
}

/// Format an already-redacted config as TOML for display.
fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unable to render config: {e}"))
}

fn save(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    config::save_config_to(cfg, &config::config_path(global))?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_secret(label: &str) -> Result<String, CliError> {
    let value = rpassword::prompt_password(format!("{label}: ")).map_err(prompt_err)?;
    if value.is_empty() {
        return Err(CliError::Validation {
            field: label.to_lowercase(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(value)
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    value: &str,
    profile_name: &str,
    secret: Secret,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        mxsync_config::store_secret(profile_name, secret, value)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(value.to_owned()))
    }
}

fn parse_zones(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .map(str::to_owned)
        .collect()
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: config::available_profiles(cfg),
    }
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "zones" => profile.zones = parse_zones(&value),
        "cloudflare_auth" => {
            if !matches!(value.as_str(), "token" | "global-key") {
                return Err(CliError::Validation {
                    field: "cloudflare_auth".into(),
                    reason: "must be 'token' or 'global-key'".into(),
                });
            }
            profile.cloudflare_auth = value;
        }
        "cloudflare_email" => profile.cloudflare_email = Some(value),
        "cloudflare_token" => profile.cloudflare_token = Some(value),
        "cloudflare_token_env" => profile.cloudflare_token_env = Some(value),
        "cloudflare_key" => profile.cloudflare_key = Some(value),
        "cloudflare_key_env" => profile.cloudflare_key_env = Some(value),
        "cloudflare_api_url" => profile.cloudflare_api_url = Some(value),
        "stalwart_url" => profile.stalwart_url = value,
        "stalwart_token" => profile.stalwart_token = Some(value),
        "stalwart_token_env" => profile.stalwart_token_env = Some(value),
        "ca_cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
            });
        }
    }
    Ok(())
}

/// Apply `defaults.<key> = value` to the `[defaults]` table.
fn set_defaults_key(defaults: &mut Defaults, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "output" => {
            if config::parse_output(&value).is_none() {
                return Err(CliError::Validation {
                    field: "defaults.output".into(),
                    reason: "must be one of table, json, json-compact, yaml, plain".into(),
                });
            }
            defaults.output = value;
        }
        "insecure" => {
            defaults.insecure = value.parse().map_err(|_| CliError::Validation {
                field: "defaults.insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?;
        }
        "timeout" => {
            defaults.timeout = value.parse().map_err(|_| CliError::Validation {
                field: "defaults.timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?;
        }
        other => {
            return Err(CliError::Validation {
                field: format!("defaults.{other}"),
                reason: format!("unknown config key 'defaults.{other}'. Valid keys: {VALID_KEYS}"),
            });
        }
    }
    Ok(())
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path(global);
    eprintln!("✨ mxsync configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        cloudflare_auth: "token".into(),
        ..Profile::default()
    };

    // 2. Mail server
    profile.stalwart_url = Input::new()
        .with_prompt("Stalwart URL")
        .default("https://mail.example.com".into())
        .interact_text()
        .map_err(prompt_err)?;
    let token = prompt_secret("Stalwart API token")?;
    profile.stalwart_token =
        prompt_keyring_storage(&token, &profile_name, Secret::StalwartToken, "Stalwart token")?;

    // 3. DNS provider auth
    let auth_choices = &["Scoped API token (recommended)", "Global API key + email"];
    let auth_selection = Select::new()
        .with_prompt("Cloudflare authentication")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if auth_selection == 0 {
        let token = prompt_secret("Cloudflare API token")?;
        profile.cloudflare_token = prompt_keyring_storage(
            &token,
            &profile_name,
            Secret::CloudflareToken,
            "Cloudflare token",
        )?;
    } else {
        profile.cloudflare_auth = "global-key".into();
        let email: String = Input::new()
            .with_prompt("Cloudflare account email")
            .interact_text()
            .map_err(prompt_err)?;
        profile.cloudflare_email = Some(email);
        let key = prompt_secret("Cloudflare global API key")?;
        profile.cloudflare_key =
            prompt_keyring_storage(&key, &profile_name, Secret::CloudflareKey, "Cloudflare key")?;
    }

    // 4. Zones
    let zones: String = Input::new()
        .with_prompt("Zone ids (comma-separated)")
        .interact_text()
        .map_err(prompt_err)?;
    profile.zones = parse_zones(&zones);

    // 5. Merge into whatever is already there
    let mut cfg = config::load_config_or_default(global);
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    save(&cfg, global)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: mxsync analyze");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default(global);
            redact(&mut cfg);
            let out = output::render_single(&global.output, &cfg, format_config, format_config);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default(global);
            if let Some(field) = key.strip_prefix("defaults.") {
                set_defaults_key(&mut cfg.defaults, &field.replace('-', "_"), value)?;
                save(&cfg, global)?;
                eprintln!("✓ Set {key}");
                return Ok(());
            }
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            if profile.cloudflare_auth.is_empty() {
                profile.cloudflare_auth = "token".into();
            }
            set_profile_key(profile, &key, value)?;
            save(&cfg, global)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default(global);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: mxsync config init");
                return Ok(());
            }
            let default = cfg.active_profile_name();
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default(global);
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            save(&cfg, global)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetSecret { secret } => {
            let cfg = config::load_config_or_default(global);
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }
            let secret = Secret::from(secret);
            let value = prompt_secret(secret.name())?;
            mxsync_config::store_secret(&profile_name, secret, &value)?;
            eprintln!(
                "✓ {} stored in system keyring for profile '{profile_name}'",
                secret.name()
            );
            Ok(())
        }
    }
}
