// Hand-written async HTTP client for the Cloudflare v4 API.
//
// Base path: https://api.cloudflare.com/client/v4/
// Auth: API token (Bearer) or global API key (X-Auth-Email + X-Auth-Key)

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{DnsRecord, Envelope, Page, ResultInfo, Zone};
use crate::Error;
use crate::transport::TransportConfig;

/// Default API root for Cloudflare.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4/";

/// Records fetched per page when walking a zone.
const RECORDS_PER_PAGE: u32 = 100;

/// How to authenticate against the Cloudflare API.
#[derive(Debug, Clone)]
pub enum CloudflareAuth {
    /// Scoped API token, sent as `Authorization: Bearer <token>`.
    ApiToken(SecretString),
    /// Legacy global API key, sent as `X-Auth-Email` + `X-Auth-Key`.
    GlobalKey { email: String, key: SecretString },
}

impl CloudflareAuth {
    fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        match self {
            Self::ApiToken(token) => {
                headers.insert(
                    AUTHORIZATION,
                    sensitive(&format!("Bearer {}", token.expose_secret()), "Authorization")?,
                );
            }
            Self::GlobalKey { email, key } => {
                headers.insert("X-Auth-Email", sensitive(email, "X-Auth-Email")?);
                headers.insert("X-Auth-Key", sensitive(key.expose_secret(), "X-Auth-Key")?);
            }
        }
        Ok(headers)
    }
}

fn sensitive(value: &str, header: &'static str) -> Result<HeaderValue, Error> {
    let mut value =
        HeaderValue::from_str(value).map_err(|_| Error::InvalidCredentialHeader { header })?;
    value.set_sensitive(true);
    Ok(value)
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Cloudflare zone and DNS record endpoints.
pub struct CloudflareClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CloudflareClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from credentials and a transport config.
    ///
    /// Auth headers are injected as defaults on every request.
    pub fn new(
        base_url: &str,
        auth: &CloudflareAuth,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(auth.headers()?)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(T, Option<ResultInfo>), Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await.map(|(result, _)| result)
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await.map(|(result, _)| result)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<(T, Option<ResultInfo>), Error> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: first_error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(Error::RateLimited { retry_after_secs });
        }

        let body = resp.text().await?;
        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(Error::Cloudflare {
                    status: status.as_u16(),
                    code: None,
                    message: if body.is_empty() {
                        status.to_string()
                    } else {
                        body
                    },
                });
            }
            Err(e) => {
                let preview = body.chars().take(200).collect::<String>();
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                });
            }
        };

        if !status.is_success() || !envelope.success {
            let first = envelope.errors.into_iter().next();
            return Err(Error::Cloudflare {
                status: status.as_u16(),
                code: first.as_ref().and_then(|e| e.code),
                message: first.map_or_else(|| status.to_string(), |e| e.message),
            });
        }

        match envelope.result {
            Some(result) => Ok((result, envelope.result_info)),
            None => Err(Error::Deserialization {
                message: "successful response without a result".into(),
                body,
            }),
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Zones ────────────────────────────────────────────────────────

    /// `GET /zones/{zone_id}`
    pub async fn get_zone(&self, zone_id: &str) -> Result<Zone, Error> {
        self.get(&format!("zones/{zone_id}"), &[])
            .await
            .map(|(zone, _)| zone)
    }

    // ── DNS records ──────────────────────────────────────────────────

    /// Fetch one page of a zone's DNS records (pages are 1-based).
    pub async fn list_records(
        &self,
        zone_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<DnsRecord>, Error> {
        let (items, info) = self
            .get::<Vec<DnsRecord>>(
                &format!("zones/{zone_id}/dns_records"),
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;

        let info = info.unwrap_or(ResultInfo {
            page,
            per_page,
            count: u32::try_from(items.len()).unwrap_or(u32::MAX),
            total_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
            total_pages: Some(page),
        });

        Ok(Page { items, info })
    }

    /// Collect every DNS record of a zone, preserving provider order.
    pub async fn list_all_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, Error> {
        let mut all = Vec::new();
        let mut page_no = 1;

        loop {
            let page = self.list_records(zone_id, page_no, RECORDS_PER_PAGE).await?;
            let more = page.has_more();
            all.extend(page.items);
            if !more {
                break;
            }
            page_no += 1;
        }

        debug!(zone_id, count = all.len(), "fetched dns records");
        Ok(all)
    }

    /// `POST /zones/{zone_id}/dns_records`
    pub async fn create_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, Error> {
        self.post(&format!("zones/{zone_id}/dns_records"), record)
            .await
    }

    /// `PUT /zones/{zone_id}/dns_records/{record_id}` (full overwrite).
    pub async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, Error> {
        self.put(&format!("zones/{zone_id}/dns_records/{record_id}"), record)
            .await
    }
}

/// Pull the first `errors[].message` out of an envelope body, if any.
fn first_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|env| env.errors.into_iter().next())
        .map(|e| e.message)
}
