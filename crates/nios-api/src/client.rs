// Async HTTP client for the NIOS Web API (WAPI).
//
// Base path: /wapi/v{version}/
// Auth: HTTP basic auth on every request
//
// Every call asks for `_return_as_object=1`, so responses arrive wrapped
// in a `{"result": ...}` envelope that is stripped before the caller
// sees it. Objects are addressed by their opaque `_ref` string.

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ResultEnvelope, WapiErrorBody, WireObject};
use crate::transport::TransportConfig;

/// Default WAPI version spoken by the provider.
pub const DEFAULT_WAPI_VERSION: &str = "2.13.6";

/// Page size used when a query doesn't ask for one.
const DEFAULT_PAGE_SIZE: u32 = 1000;

// ── Proxy search ─────────────────────────────────────────────────────

/// Where a grid member should resolve searches (`_proxy_search`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxySearch {
    /// Forward the search to the grid master.
    GridMaster,
    /// Search the local member only.
    Local,
}

impl ProxySearch {
    fn as_param(self) -> &'static str {
        match self {
            Self::GridMaster => "GM",
            Self::Local => "LOCAL",
        }
    }
}

// ── List query ───────────────────────────────────────────────────────

/// Filters for a WAPI list (search) call.
///
/// Plain filters map to `field=value` query parameters; extensible
/// attribute filters map to `*Name=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    filters: Vec<(String, String)>,
    page_size: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a regular object field exactly.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Match an extensible attribute value.
    pub fn ext_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.filters.push((format!("*{name}"), value.into()));
        self
    }

    /// Override the page size used for `_paging` (defaults to 1000).
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the NIOS WAPI.
///
/// Generic over [`WireObject`] types: the same five verbs serve every
/// DHCP object the provider manages.
pub struct WapiClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
    proxy_search: Option<ProxySearch>,
}

impl WapiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from the grid master URL, WAPI version, credentials and
    /// transport config.
    pub fn new(
        host_url: &str,
        wapi_version: &str,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(host_url, wapi_version)?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Wrap an existing `reqwest::Client` with an already-normalized base URL.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username: username.into(),
            password,
            proxy_search: None,
        }
    }

    /// Send `_proxy_search` with every request.
    pub fn with_proxy_search(mut self, proxy_search: ProxySearch) -> Self {
        self.proxy_search = Some(proxy_search);
        self
    }

    /// The versioned WAPI base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `https://host/wapi/v{version}/` from a bare host URL.
    ///
    /// A URL that already carries a `/wapi/v...` path is kept as is.
    pub fn normalize_base_url(raw: &str, wapi_version: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.contains("/wapi/v") {
            url.set_path(&format!("{path}/"));
        } else {
            let version = wapi_version.trim_start_matches('v');
            url.set_path(&format!("{path}/wapi/v{version}/"));
        }

        Ok(url)
    }

    // ── URL / param builders ─────────────────────────────────────────

    /// Join an object type or `_ref` onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn common_params(&self, return_fields: &[&str]) -> Vec<(String, String)> {
        let mut params = vec![("_return_as_object".to_owned(), "1".to_owned())];
        if !return_fields.is_empty() {
            params.push(("_return_fields".to_owned(), return_fields.join(",")));
        }
        if let Some(proxy) = self.proxy_search {
            params.push(("_proxy_search".to_owned(), proxy.as_param().to_owned()));
        }
        params
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Search objects of type `T`, following `_page_id` until exhausted.
    ///
    /// `GET /{object}?field=value&*Attr=value&_paging=1&_max_results=N`
    pub async fn list<T: WireObject>(&self, query: &ListQuery) -> Result<Vec<T>, Error> {
        let url = self.url(T::OBJECT_TYPE)?;
        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        let mut base_params = self.common_params(T::RETURN_FIELDS);
        base_params.extend(query.filters.iter().cloned());
        base_params.push(("_paging".into(), "1".into()));
        base_params.push(("_max_results".into(), page_size.to_string()));

        let mut all = Vec::new();
        let mut page_id: Option<String> = None;

        loop {
            let mut params = base_params.clone();
            if let Some(ref id) = page_id {
                params.push(("_page_id".into(), id.clone()));
            }
            debug!(object = T::OBJECT_TYPE, filters = ?query.filters, "GET {url}");

            let resp = self
                .authorize(self.http.get(url.clone()).query(&params))
                .send()
                .await?;
            let envelope: ResultEnvelope<Vec<T>> = self.handle_response(resp).await?;
            trace!(received = envelope.result.len(), "page received");
            all.extend(envelope.result);

            match envelope.next_page_id {
                Some(next) if !next.is_empty() => page_id = Some(next),
                _ => break,
            }
        }

        Ok(all)
    }

    /// Read a single object by reference.
    ///
    /// `GET /{_ref}?_return_fields=...`
    pub async fn get<T: WireObject>(&self, reference: &str) -> Result<T, Error> {
        let url = self.url(reference)?;
        debug!("GET {url}");

        let params = self.common_params(T::RETURN_FIELDS);
        let resp = self
            .authorize(self.http.get(url).query(&params))
            .send()
            .await?;
        let envelope: ResultEnvelope<T> = self.handle_response(resp).await?;
        Ok(envelope.result)
    }

    /// Create an object and return it as stored by the server.
    ///
    /// `POST /{object}?_return_fields=...`
    pub async fn create<T: WireObject>(&self, body: &T) -> Result<T, Error> {
        let url = self.url(T::OBJECT_TYPE)?;
        debug!("POST {url}");

        let params = self.common_params(T::RETURN_FIELDS);
        let resp = self
            .authorize(self.http.post(url).query(&params).json(body))
            .send()
            .await?;
        let envelope: ResultEnvelope<T> = self.handle_response(resp).await?;
        Ok(envelope.result)
    }

    /// Replace the writable fields of an object.
    ///
    /// `PUT /{_ref}?_return_fields=...`
    pub async fn update<T: WireObject>(&self, reference: &str, body: &T) -> Result<T, Error> {
        let url = self.url(reference)?;
        debug!("PUT {url}");

        let params = self.common_params(T::RETURN_FIELDS);
        let resp = self
            .authorize(self.http.put(url).query(&params).json(body))
            .send()
            .await?;
        let envelope: ResultEnvelope<T> = self.handle_response(resp).await?;
        Ok(envelope.result)
    }

    /// Delete an object, returning the reference the server removed.
    ///
    /// `DELETE /{_ref}`
    pub async fn delete(&self, reference: &str) -> Result<String, Error> {
        let url = self.url(reference)?;
        debug!("DELETE {url}");

        let params = self.common_params(&[]);
        let resp = self
            .authorize(self.http.delete(url).query(&params))
            .send()
            .await?;
        let envelope: ResultEnvelope<String> = self.handle_response(resp).await?;
        Ok(envelope.result)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("json"));
        let body = resp.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: if is_json {
                    format!("{e} (body preview: {preview:?})")
                } else {
                    format!("unexpected non-JSON response: {preview:?}")
                },
                body: body.clone(),
            }
        })
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: "grid master rejected the supplied credentials".into(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();

        match serde_json::from_str::<WapiErrorBody>(&raw) {
            Ok(body) if body.error.is_some() || body.text.is_some() => Error::Wapi {
                status: status.as_u16(),
                message: body
                    .text
                    .or(body.error)
                    .unwrap_or_else(|| status.to_string()),
                code: body.code,
            },
            _ => Error::Wapi {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                },
                code: None,
            },
        }
    }
}
