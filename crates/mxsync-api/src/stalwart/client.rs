// Stalwart management API HTTP client
//
// Bearer-token authenticated reads against `{instance}/api/...`. The
// `{ data: ... }` envelope is unwrapped before callers see the payload.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{DataEnvelope, ErrorBody, ItemList, MailServerRecord};
use crate::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for a Stalwart instance's management API.
pub struct StalwartClient {
    http: reqwest::Client,
    base_url: Url,
}

impl StalwartClient {
    /// Create a client for the instance at `base_url` (the server root,
    /// e.g. `https://mail.example.com`).
    pub fn new(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| Error::InvalidCredentialHeader {
                header: "Authorization",
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The instance root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}api/{segments...}`, each segment percent-encoded.
    fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.join("api")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the `{ data }` envelope.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: "mail server rejected the access token".into(),
            });
        }

        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Stalwart {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        // Stalwart may answer 200 with an error body.
        if let Some(message) = error_message(&body) {
            return Err(Error::Stalwart {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: DataEnvelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;
        Ok(envelope.data)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List every domain hosted on the mail server.
    ///
    /// `GET /api/domain`
    pub async fn list_domains(&self) -> Result<Vec<String>, Error> {
        let url = self.api_url(&["domain"])?;
        let list: ItemList<String> = self.get(url).await?;
        debug!(count = list.items.len(), total = ?list.total, "listed mail domains");
        Ok(list.items)
    }

    /// The DNS records the mail server expects for `domain`.
    ///
    /// `GET /api/domain/{domain}`
    pub async fn domain_records(&self, domain: &str) -> Result<Vec<MailServerRecord>, Error> {
        let url = self.api_url(&["domain", domain])?;
        self.get(url).await
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|e| match e.details {
            Some(details) => format!("{}: {details}", e.error),
            None => e.error,
        })
}
