//! Integration tests for the `mxsync` CLI binary.
//!
//! Parsing, help, completions and config management run offline against a
//! temporary config file. The reconcile commands run against a wiremock
//! server standing in for both the DNS provider and the mail server.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ZONE_ID: &str = "023e105f4ecef8ad9ca31a8372d0c353";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `mxsync` binary with env isolation.
///
/// Clears all `MXSYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn mxsync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("mxsync");
    cmd.env("HOME", "/tmp/mxsync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/mxsync-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("MXSYNC_PROFILE")
        .env_remove("MXSYNC_CONFIG")
        .env_remove("MXSYNC_OUTPUT")
        .env_remove("MXSYNC_INSECURE")
        .env_remove("MXSYNC_TIMEOUT");
    cmd
}

/// `mxsync --config <path> ...`
fn mxsync_with_config(config: &Path) -> assert_cmd::Command {
    let mut cmd = mxsync_cmd();
    cmd.arg("--config").arg(config);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write a config whose profile points both remotes at `server`.
///
/// Secrets come from env vars so the keyring is never consulted first.
fn write_config(dir: &TempDir, server: &MockServer, zones: &[&str]) -> PathBuf {
    let path = dir.path().join("config.toml");
    let zones = zones
        .iter()
        .map(|z| format!("\"{z}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let body = format!(
        r#"default_profile = "test"

[profiles.test]
zones = [{zones}]
cloudflare_token_env = "MXSYNC_E2E_CF_TOKEN"
cloudflare_api_url = "{uri}/"
stalwart_url = "{uri}"
stalwart_token_env = "MXSYNC_E2E_MAIL_TOKEN"
"#,
        uri = server.uri()
    );
    std::fs::write(&path, body).unwrap();
    path
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    cmd.env("MXSYNC_E2E_CF_TOKEN", "cf-token")
        .env("MXSYNC_E2E_MAIL_TOKEN", "mail-token");
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn cf_ok(result: &Value) -> Value {
    json!({ "success": true, "errors": [], "messages": [], "result": result })
}

/// Mount a zone `example.com` holding a stale DMARC record, and a mail
/// server that wants an MX and a stricter DMARC policy.
async fn mount_drifted_zone(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/zones/{ZONE_ID}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cf_ok(&json!({ "id": ZONE_ID, "name": "example.com" }))),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/zones/{ZONE_ID}/dns_records")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [
                { "id": "r-dmarc", "type": "TXT", "name": "_dmarc.example.com", "content": "v=DMARC1; p=none" }
            ],
            "result_info": { "page": 1, "per_page": 100, "count": 1, "total_count": 1, "total_pages": 1 }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/domain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "items": ["example.com", "example.net"], "total": 2 }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/domain/example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "type": "MX", "name": "example.com.", "content": "10 mail.example.com." },
                { "type": "TXT", "name": "_dmarc.example.com.", "content": "v=DMARC1; p=reject; rua=mailto:postmaster@example.com" }
            ]
        })))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = mxsync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    mxsync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("analyze")
            .and(predicate::str::contains("plan"))
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    mxsync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mxsync"));
}

#[test]
fn test_invalid_output_format_is_usage_error() {
    mxsync_cmd()
        .args(["analyze", "-o", "xml"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    mxsync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mxsync"));
}

#[test]
fn test_completions_zsh() {
    mxsync_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_analyze_without_config_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = mxsync_with_config(&dir.path().join("absent.toml"))
        .arg("analyze")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("mxsync config init"), "{text}");
}

#[test]
fn test_config_set_then_profiles_and_show() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    mxsync_with_config(&config)
        .args(["config", "set", "stalwart_url", "https://mail.example.com"])
        .assert()
        .success();
    mxsync_with_config(&config)
        .args(["config", "set", "stalwart_token", "very-secret"])
        .assert()
        .success();
    mxsync_with_config(&config)
        .args(["config", "set", "zones", "aaa,bbb"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("https://mail.example.com"));
    assert!(written.contains("\"aaa\""));

    mxsync_with_config(&config)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));

    mxsync_with_config(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("****").and(predicate::str::contains("very-secret").not()));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    mxsync_with_config(&dir.path().join("config.toml"))
        .args(["config", "set", "controller", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_use_switches_default_profile() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    mxsync_with_config(&config)
        .args(["-p", "work", "config", "set", "stalwart_url", "https://mx.example.org"])
        .assert()
        .success();
    mxsync_with_config(&config)
        .args(["config", "use", "work"])
        .assert()
        .success();
    mxsync_with_config(&config)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("work *"));
}

#[test]
fn test_config_use_unknown_profile_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    mxsync_with_config(&config)
        .args(["config", "set", "stalwart_url", "https://mail.example.com"])
        .assert()
        .success();

    mxsync_with_config(&config)
        .args(["config", "use", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("default"));
}

#[test]
fn test_profile_without_zones_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        r#"
[profiles.default]
cloudflare_token = "cf"
stalwart_url = "https://mail.example.com"
stalwart_token = "t"
"#,
    )
    .unwrap();

    mxsync_with_config(&config)
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No zones configured"));
}

#[test]
fn test_config_defaults_output_applies_without_flag() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    mxsync_with_config(&config)
        .args(["config", "set", "defaults.output", "json"])
        .assert()
        .success();
    assert!(std::fs::read_to_string(&config).unwrap().contains("output = \"json\""));

    let output = mxsync_with_config(&config)
        .args(["config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["defaults"]["output"], "json");

    mxsync_with_config(&config)
        .args(["config", "set", "defaults.output", "xml"])
        .assert()
        .code(2);
}

// ── Reconciliation against mock remotes ─────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_json_reports_drift_and_missing() {
    let server = MockServer::start().await;
    mount_drifted_zone(&server).await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[ZONE_ID]);

    let mut cmd = mxsync_with_config(&config);
    cmd.args(["analyze", "-o", "json"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let outcomes: Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = &outcomes[0]["report"]["results"];
    assert_eq!(outcomes[0]["zone_id"], ZONE_ID);
    assert_eq!(results[0]["target"]["type"], "MX");
    assert_eq!(results[0]["sync"], false);
    assert!(results[0].get("actual").is_none());
    assert_eq!(results[1]["sync"], false);
    assert_eq!(results[1]["actual"]["content"], "v=DMARC1; p=none");
    assert_eq!(results[1]["actual"]["id"], "r-dmarc");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_uses_configured_default_output() {
    let server = MockServer::start().await;
    mount_drifted_zone(&server).await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[ZONE_ID]);
    let body = std::fs::read_to_string(&config).unwrap();
    std::fs::write(&config, format!("{body}\n[defaults]\noutput = \"json\"\n")).unwrap();

    let mut cmd = mxsync_with_config(&config);
    cmd.arg("analyze");
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let outcomes: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcomes[0]["zone_id"], ZONE_ID);

    let mut cmd = mxsync_with_config(&config);
    cmd.args(["analyze", "-o", "plain"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("example.com\tmissing\tMX"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_failed_zone_keeps_other_zones() {
    let server = MockServer::start().await;
    mount_drifted_zone(&server).await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[ZONE_ID, "ffffffffffffffffffffffffffffffff"]);

    let mut cmd = mxsync_with_config(&config);
    cmd.args(["analyze", "-o", "plain"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(10));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("example.com\tmissing\tMX"), "{stdout}");
    assert!(stdout.contains("example.com\tdrifted\tTXT"), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ffffffffffffffffffffffffffffffff"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plan_lists_create_and_update() {
    let server = MockServer::start().await;
    mount_drifted_zone(&server).await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[ZONE_ID]);

    let mut cmd = mxsync_with_config(&config);
    cmd.args(["plan", "-o", "json"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let plans: Value = serde_json::from_slice(&output.stdout).unwrap();
    let ops = plans[0]["operations"].as_array().unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0]["action"], json!({ "kind": "create" }));
    assert_eq!(ops[0]["payload"]["priority"], 10);
    assert_eq!(ops[0]["payload"]["content"], "mail.example.com");
    assert_eq!(ops[1]["action"], json!({ "kind": "update", "id": "r-dmarc" }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_without_yes_refuses_non_interactive() {
    let server = MockServer::start().await;
    mount_drifted_zone(&server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[ZONE_ID]);

    let mut cmd = mxsync_with_config(&config);
    cmd.arg("sync");
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_yes_creates_and_updates() {
    let server = MockServer::start().await;
    mount_drifted_zone(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/zones/{ZONE_ID}/dns_records")))
        .and(body_partial_json(json!({
            "type": "MX", "name": "example.com", "content": "mail.example.com", "priority": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(cf_ok(&json!({
            "id": "r-mx", "type": "MX", "name": "example.com", "content": "mail.example.com", "priority": 10
        }))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/zones/{ZONE_ID}/dns_records/r-dmarc")))
        .and(body_partial_json(json!({
            "type": "TXT",
            "content": "v=DMARC1; p=reject; rua=mailto:postmaster@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(cf_ok(&json!({
            "id": "r-dmarc", "type": "TXT", "name": "_dmarc.example.com",
            "content": "v=DMARC1; p=reject; rua=mailto:postmaster@example.com"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[ZONE_ID]);

    let mut cmd = mxsync_with_config(&config);
    cmd.args(["sync", "--yes"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(
        String::from_utf8_lossy(&output.stdout).contains("1 created, 1 updated, 0 failed"),
        "{}",
        combined_output(&output)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_reports_failed_write_with_exit_code() {
    let server = MockServer::start().await;
    mount_drifted_zone(&server).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 81057, "message": "Record already exists." }],
            "messages": [],
            "result": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cf_ok(&json!({
            "id": "r-dmarc", "type": "TXT", "name": "_dmarc.example.com", "content": "x"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[ZONE_ID]);

    let mut cmd = mxsync_with_config(&config);
    cmd.args(["sync", "--yes", "-o", "json"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(10));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["applied"].as_array().unwrap().len(), 1);
    assert_eq!(report["failed"][0]["target"]["type"], "MX");
    assert!(
        report["failed"][0]["error"]
            .as_str()
            .unwrap()
            .contains("Record already exists")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_with_only_rejected_records_skips_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/zones/{ZONE_ID}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cf_ok(&json!({ "id": ZONE_ID, "name": "example.com" }))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/zones/{ZONE_ID}/dns_records")))
        .respond_with(ResponseTemplate::new(200).set_body_json(cf_ok(&json!([]))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/domain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "items": ["example.com"], "total": 1 }
        })))
        .mount(&server)
        .await;
    // An MX without a priority cannot become a provider payload.
    Mock::given(method("GET"))
        .and(path("/api/domain/example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "type": "MX", "name": "example.com.", "content": "mail.example.com." }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[ZONE_ID]);

    // No --yes and no terminal: still no prompt, since nothing would be written.
    let mut cmd = mxsync_with_config(&config);
    cmd.args(["sync", "-o", "plain"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(10), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("example.com\tfailed\tMX\texample.com"), "{stdout}");
    assert!(!combined_output(&output).contains("--yes"));
}
