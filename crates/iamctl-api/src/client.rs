// Generic async HTTP client for one IBM Cloud service.
//
// Every resource type speaks plain JSON over REST, so a single client
// carries the request/response mechanics: auth header injection, path
// segment encoding, ETag capture, and error-body message extraction.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, ETAG, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Authenticator;
use crate::error::Error;
use crate::service::Service;
use crate::transport::TransportConfig;

// ── Error response shapes ────────────────────────────────────────────

/// Message, code and trace pulled from an IBM Cloud error body.
///
/// Services disagree on the envelope: IAM access groups and policy
/// management use `{"errors":[{"code","message"}],"trace"}`, IAM identity
/// uses `{"errorCode","errorMessage"}`, Schematics uses `{"error"}` or
/// `{"message"}`. Lookup order follows the IBM SDK core.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ErrorBody {
    pub(crate) message: Option<String>,
    pub(crate) code: Option<String>,
    pub(crate) trace: Option<String>,
}

impl ErrorBody {
    pub(crate) fn parse(raw: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Self::default();
        };

        let first_error = value
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first());

        let message = first_error
            .and_then(|e| e.get("message"))
            .or_else(|| value.get("error").filter(|v| v.is_string()))
            .or_else(|| value.get("message"))
            .or_else(|| value.get("errorMessage"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        let code = first_error
            .and_then(|e| e.get("code"))
            .or_else(|| value.get("errorCode"))
            .or_else(|| value.get("code"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        let trace = value
            .get("trace")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Self {
            message,
            code,
            trace,
        }
    }
}

// ── Request / response ───────────────────────────────────────────────

/// One HTTP exchange, described independently of the transport.
///
/// `segments` are appended to the service base URL one by one, so values
/// taken from caller input are always percent-encoded.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, segments: Vec<String>) -> Self {
        Self {
            method,
            segments,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `/a/b/c` rendering for logs.
    pub fn display_path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// A successful response: decoded JSON body plus the ETag header.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub etag: Option<String>,
    /// `Value::Null` for empty bodies (204, bodiless 200/202).
    pub body: Value,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one IBM Cloud service endpoint.
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: Url,
    service: Service,
    auth: Authenticator,
}

impl ServiceClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an endpoint, authenticator and transport config.
    pub fn new(
        service: Service,
        base_url: &str,
        auth: Authenticator,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(service, base_url, http, auth)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        service: Service,
        base_url: &str,
        http: reqwest::Client,
        auth: Authenticator,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            service,
            auth,
        })
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, segments: &[String]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Send one request and decode the response.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        let url = self.url(&request.segments)?;
        debug!(service = %self.service, "{} {url}", request.method);

        let mut builder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        for (name, value) in &request.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            builder = builder.header(header_name, header_value);
        }

        if let Some(authorization) = self.auth.authorization(&self.http).await? {
            let mut value =
                HeaderValue::from_str(authorization.expose_secret()).map_err(|e| {
                    Error::Authentication {
                        message: format!("invalid authorization header value: {e}"),
                    }
                })?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(resp: reqwest::Response) -> Result<ApiResponse, Error> {
        let status = resp.status();
        let etag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let raw = resp.text().await?;
        trace!(status = status.as_u16(), body = %raw, "response");

        if !status.is_success() {
            return Err(Self::parse_error(status, raw));
        }

        let body = if raw.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&raw).map_err(|e| {
                let preview: String = raw.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: raw.clone(),
                }
            })?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            etag,
            body,
        })
    }

    fn parse_error(status: reqwest::StatusCode, raw: String) -> Error {
        let parsed = ErrorBody::parse(&raw);
        let message = match parsed.message {
            Some(message) => message,
            None if !raw.trim().is_empty() => raw,
            None => status
                .canonical_reason()
                .map_or_else(|| status.to_string(), str::to_owned),
        };

        Error::Api {
            status: status.as_u16(),
            message,
            code: parsed.code,
            trace: parsed.trace,
        }
    }
}
