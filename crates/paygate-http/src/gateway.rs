// crates/paygate-http/src/gateway.rs
// ============================================================================
// Module: HTTP Gateway Client
// Description: Payment lookup, order lookup, and cancel over blocking HTTP.
// Purpose: Translate gateway HTTP answers into probe results and errors.
// Dependencies: paygate-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`HttpGateway`] issues bounded requests against the gateway REST API.
//! Redirects are never followed, path segments are percent-encoded, and
//! response bodies are read up to a hard byte limit.
//!
//! Status mapping for reads: 2xx parses a record, any 4xx is "not found",
//! 5xx and transport failures are transient.
//! Cancels never retry and keep the raw body on every failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::time::Duration;

use paygate_core::CancelRequest;
use paygate_core::GatewayError;
use paygate_core::GatewayPaymentRecord;
use paygate_core::GatewayProbe;
use paygate_core::GatewayRejection;
use paygate_core::IdempotencyKey;
use paygate_core::OrderReference;
use paygate_core::PaymentGateway;
use paygate_core::PaymentId;
use paygate_core::ProbeResult;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Authorization scheme sent before the API secret.
pub const DEFAULT_AUTH_SCHEME: &str = "PortOne";
/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default response size limit in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Header carrying the cancel idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
/// Default user agent for outbound requests.
const DEFAULT_USER_AGENT: &str = concat!("paygate/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP gateway client.
///
/// # Invariants
/// - `base_url` must be absolute; `http://` requires `allow_http`.
/// - `api_secret` is never printed by `Debug`.
/// - `max_response_bytes` is a hard upper bound on response bodies.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpGatewayConfig {
    /// Gateway API base URL (for example `https://api.example.com`).
    pub base_url: String,
    /// API secret sent in the `Authorization` header.
    pub api_secret: String,
    /// Authorization scheme preceding the secret.
    pub auth_scheme: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string.
    pub user_agent: String,
    /// Allow cleartext HTTP base URLs.
    pub allow_http: bool,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl HttpGatewayConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_secret: api_secret.into(),
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_http: false,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl fmt::Debug for HttpGatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpGatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_secret", &"<redacted>")
            .field("auth_scheme", &self.auth_scheme)
            .field("timeout_ms", &self.timeout_ms)
            .field("user_agent", &self.user_agent)
            .field("allow_http", &self.allow_http)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

/// Errors raised while constructing the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpGatewayError {
    /// Base URL failed validation.
    #[error("invalid gateway base url: {0}")]
    InvalidBaseUrl(String),
    /// Credentials are missing or malformed.
    #[error("invalid gateway credentials: {0}")]
    InvalidCredentials(String),
    /// HTTP client could not be built.
    #[error("http client build failed: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Blocking HTTP implementation of the gateway interfaces.
///
/// # Invariants
/// - Redirects are not followed.
/// - Responses exceeding the size limit fail as invalid responses.
pub struct HttpGateway {
    /// Client configuration.
    config: HttpGatewayConfig,
    /// Parsed base URL.
    base: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpGateway {
    /// Creates a gateway client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpGatewayError`] when the base URL or credentials are
    /// invalid, or the HTTP client cannot be built.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, HttpGatewayError> {
        let base = parse_base_url(&config.base_url, config.allow_http)?;
        if config.api_secret.trim().is_empty() {
            return Err(HttpGatewayError::InvalidCredentials("api secret is empty".to_string()));
        }
        if config.auth_scheme.trim().is_empty() || config.auth_scheme.contains(char::is_whitespace)
        {
            return Err(HttpGatewayError::InvalidCredentials(
                "auth scheme must be a single token".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| HttpGatewayError::Client(err.to_string()))?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpGatewayConfig {
        &self.config
    }

    /// Builds an endpoint URL from percent-encoded path segments.
    ///
    /// Dot and empty segments are collapsed by URL normalization, so they are
    /// refused rather than allowed to address a different route.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        if let Some(segment) = segments.iter().find(|segment| !is_routable_segment(segment)) {
            return Err(GatewayError::InvalidRequest(format!(
                "'{segment}' cannot be used as a path segment"
            )));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidResponse {
                detail: "gateway base url cannot carry a path".to_string(),
                body: String::new(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attaches credentials and sends the request.
    fn send(&self, request: RequestBuilder) -> Result<(u16, String), GatewayError> {
        let authorization = format!("{} {}", self.config.auth_scheme, self.config.api_secret);
        let mut response = request
            .header(AUTHORIZATION, authorization)
            .send()
            .map_err(|err| GatewayError::unreachable(describe_transport_error(&err)))?;
        let status = response.status().as_u16();
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        Ok((status, String::from_utf8_lossy(&body).into_owned()))
    }
}

impl GatewayProbe for HttpGateway {
    fn probe(&self, candidate: &str) -> Result<ProbeResult, GatewayError> {
        if !is_routable_segment(candidate) {
            return Ok(ProbeResult::not_found());
        }
        let url = self.endpoint(&["payments", candidate])?;
        let (status, body) = self.send(self.client.get(url))?;
        interpret_lookup(status, body, parse_payment_body)
    }

    fn probe_order(&self, order: &OrderReference) -> Result<ProbeResult, GatewayError> {
        let mut url = self.endpoint(&["payments"])?;
        url.query_pairs_mut().append_pair("order_id", order.as_str());
        let (status, body) = self.send(self.client.get(url))?;
        interpret_lookup(status, body, parse_order_body)
    }
}

impl PaymentGateway for HttpGateway {
    fn cancel(
        &self,
        payment_id: &PaymentId,
        request: &CancelRequest,
        idempotency_key: &IdempotencyKey,
    ) -> Result<GatewayPaymentRecord, GatewayError> {
        if !is_routable_segment(payment_id.as_str()) {
            return Err(GatewayError::InvalidRequest(format!(
                "payment id '{payment_id}' cannot be used as a path segment"
            )));
        }
        let url = self.endpoint(&["payments", payment_id.as_str(), "cancel"])?;
        let payload = serde_json::to_vec(request).map_err(|err| GatewayError::InvalidResponse {
            detail: format!("cancel request serialization failed: {err}"),
            body: String::new(),
        })?;
        let builder = self
            .client
            .post(url)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        let (status, body) = self.send(builder)?;
        match status {
            200..=299 => match parse_payment_body(&body)? {
                Some(record) => Ok(record),
                None => Err(GatewayError::InvalidResponse {
                    detail: "cancel response carried no payment record".to_string(),
                    body,
                }),
            },
            400..=499 => Err(GatewayError::Rejected(GatewayRejection::from_body(status, body))),
            500..=599 => Err(GatewayError::Unreachable {
                detail: format!("gateway returned status {status}"),
                body: Some(body),
            }),
            _ => Err(GatewayError::InvalidResponse {
                detail: format!("unexpected status {status}"),
                body,
            }),
        }
    }
}

// ============================================================================
// SECTION: Response Interpretation
// ============================================================================

/// Returns true when `segment` addresses exactly one path component.
fn is_routable_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
}

/// Parser from a 2xx body to an optional record.
type BodyParser = fn(&str) -> Result<Option<GatewayPaymentRecord>, GatewayError>;

/// Maps a read response to a probe result.
fn interpret_lookup(
    status: u16,
    body: String,
    parse: BodyParser,
) -> Result<ProbeResult, GatewayError> {
    match status {
        200..=299 => Ok(parse(&body)?.map_or_else(ProbeResult::not_found, ProbeResult::found)),
        400..=499 => Ok(ProbeResult::not_found()),
        500..=599 => Err(GatewayError::Unreachable {
            detail: format!("gateway returned status {status}"),
            body: Some(body),
        }),
        _ => Err(GatewayError::InvalidResponse {
            detail: format!("unexpected status {status}"),
            body,
        }),
    }
}

/// Parses a single payment record, optionally wrapped in `{"payment": ...}`.
fn parse_payment_body(body: &str) -> Result<Option<GatewayPaymentRecord>, GatewayError> {
    let value = parse_json(body)?;
    let record = value.get("payment").filter(|inner| inner.is_object()).unwrap_or(&value);
    record_from_value(record, body).map(Some)
}

/// Parses an order lookup body: a single record or `{"items": [...]}`.
fn parse_order_body(body: &str) -> Result<Option<GatewayPaymentRecord>, GatewayError> {
    let value = parse_json(body)?;
    match value.get("items") {
        Some(Value::Array(items)) => {
            items.first().map(|first| record_from_value(first, body)).transpose()
        }
        Some(_) => Err(GatewayError::InvalidResponse {
            detail: "order lookup items must be an array".to_string(),
            body: body.to_string(),
        }),
        None => record_from_value(&value, body).map(Some),
    }
}

/// Parses a body as JSON.
fn parse_json(body: &str) -> Result<Value, GatewayError> {
    serde_json::from_str(body).map_err(|err| GatewayError::InvalidResponse {
        detail: format!("response is not json: {err}"),
        body: body.to_string(),
    })
}

/// Deserializes a record from a JSON value.
fn record_from_value(value: &Value, body: &str) -> Result<GatewayPaymentRecord, GatewayError> {
    serde_json::from_value(value.clone()).map_err(|err| GatewayError::InvalidResponse {
        detail: format!("response is not a payment record: {err}"),
        body: body.to_string(),
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates and parses the gateway base URL.
fn parse_base_url(raw: &str, allow_http: bool) -> Result<Url, HttpGatewayError> {
    let url =
        Url::parse(raw.trim()).map_err(|err| HttpGatewayError::InvalidBaseUrl(err.to_string()))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => {
            return Err(HttpGatewayError::InvalidBaseUrl(
                "cleartext http requires allow_http".to_string(),
            ));
        }
        other => {
            return Err(HttpGatewayError::InvalidBaseUrl(format!("unsupported scheme {other}")));
        }
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(HttpGatewayError::InvalidBaseUrl("url host required".to_string()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(HttpGatewayError::InvalidBaseUrl("url credentials are not allowed".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(HttpGatewayError::InvalidBaseUrl(
            "base url must not carry a query or fragment".to_string(),
        ));
    }
    Ok(url)
}

/// Summarizes a transport error without echoing credentials.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_redirect() {
        "redirect not allowed".to_string()
    } else {
        "http request failed".to_string()
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, GatewayError> {
    let oversized = || GatewayError::InvalidResponse {
        detail: format!("response exceeds {max_bytes} bytes"),
        body: String::new(),
    };
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| oversized())?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(oversized());
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|_| GatewayError::unreachable("failed to read response body"))?;
    if buf.len() > max_bytes {
        return Err(oversized());
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
