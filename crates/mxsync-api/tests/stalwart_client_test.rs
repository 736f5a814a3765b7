#![allow(clippy::unwrap_used)]
// Integration tests for `StalwartClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mxsync_api::{Error, MailServerRecord, StalwartClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StalwartClient) {
    let server = MockServer::start().await;
    let client = StalwartClient::new(
        &server.uri(),
        &SecretString::from("mail-token".to_string()),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_domains_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/domain"))
        .and(header("Authorization", "Bearer mail-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "items": ["example.com", "example.org"], "total": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let domains = client.list_domains().await.unwrap();
    assert_eq!(domains, vec!["example.com", "example.org"]);
}

#[tokio::test]
async fn test_domain_records() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/domain/example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "type": "MX", "name": "example.com.", "content": "10 mail.example.com." },
                { "type": "TXT", "name": "example.com.", "content": "v=spf1 mx ra=postmaster -all" }
            ]
        })))
        .mount(&server)
        .await;

    let records = client.domain_records("example.com").await.unwrap();
    assert_eq!(
        records,
        vec![
            MailServerRecord {
                record_type: "MX".into(),
                name: "example.com.".into(),
                content: "10 mail.example.com.".into(),
            },
            MailServerRecord {
                record_type: "TXT".into(),
                name: "example.com.".into(),
                content: "v=spf1 mx ra=postmaster -all".into(),
            },
        ]
    );
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stalwart/api/domain"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "items": [] } })),
        )
        .mount(&server)
        .await;

    let client = StalwartClient::from_reqwest(
        &format!("{}/stalwart", server.uri()),
        reqwest::Client::new(),
    )
    .unwrap();
    assert!(client.list_domains().await.unwrap().is_empty());
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/domain"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_domains().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_error_body_on_success_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/domain/missing.example"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "notFound",
            "details": "Domain does not exist"
        })))
        .mount(&server)
        .await;

    let result = client.domain_records("missing.example").await;
    match result {
        Err(Error::Stalwart { status, message }) => {
            assert_eq!(status, 200);
            assert_eq!(message, "notFound: Domain does not exist");
        }
        other => panic!("expected Stalwart error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/domain"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = client.list_domains().await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, Error::Stalwart { status: 500, .. }));
}
