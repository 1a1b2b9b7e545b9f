//! Authenticated App Center HTTP client
//!
//! Every API request carries the `x-api-token` header and a JSON content
//! type. The client never interprets status codes itself: callers compare
//! [`ApiResponse::status`] against the code their operation expects, usually
//! through [`ApiResponse::expect_status`].

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::app::App;
use crate::error::{AppCenterError, Result};
use crate::observer::{HttpObserver, TracingObserver};
use crate::types::PollOptions;

/// Public App Center API host
pub const DEFAULT_BASE_URL: &str = "https://api.appcenter.ms";

/// Header carrying the API token
pub const API_TOKEN_HEADER: &str = "x-api-token";

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub(crate) const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Placeholder for requests without a body
pub(crate) const NO_BODY: Option<&()> = None;

/// Where a request's credentials go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// `x-api-token` header plus custom headers
    ApiToken,
    /// Already carried by the URL (upload domain, blob SAS)
    SignedUrl,
}

/// App Center API client
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    token: String,
    token_header: HeaderValue,
    base_url: Url,
    headers: HeaderMap,
    observer: Option<Arc<dyn HttpObserver>>,
    poll: PollOptions,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("custom_headers", &self.headers.len())
            .field("observer", &self.observer.is_some())
            .field("poll", &self.poll)
            .finish()
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    token: String,
    base_url: String,
    headers: Vec<(String, String)>,
    observer: Option<Arc<dyn HttpObserver>>,
    poll: PollOptions,
}

impl ClientBuilder {
    /// Override the API host, e.g. to point at a local stub server
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Add a header sent with every API request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Install an observer that sees every request and response
    pub fn observer(mut self, observer: Arc<dyn HttpObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Dump requests and responses through `tracing` at debug level
    pub fn debug(mut self, enabled: bool) -> Self {
        if enabled {
            self.observer = Some(Arc::new(TracingObserver));
        }
        self
    }

    /// Set the upload-status polling policy
    pub fn poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Client> {
        if self.token.trim().is_empty() {
            return Err(AppCenterError::ConfigurationError(
                "API token must not be empty".to_string(),
            ));
        }

        let mut token_header = HeaderValue::from_str(&self.token).map_err(|_| {
            AppCenterError::ConfigurationError("API token contains invalid characters".to_string())
        })?;
        token_header.set_sensitive(true);

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                AppCenterError::ConfigurationError(format!("Invalid header name: {}", name))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                AppCenterError::ConfigurationError(format!("Invalid value for header {}", name))
            })?;
            headers.append(name, value);
        }

        if self.poll.max_attempts == 0 {
            return Err(AppCenterError::ConfigurationError(
                "poll max_attempts must be at least 1".to_string(),
            ));
        }

        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(AppCenterError::ConfigurationError(format!(
                "Base URL cannot be used as a base: {}",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("appcenter-rs/", env!("CARGO_PKG_VERSION")))
            .use_rustls_tls()
            .build()?;

        debug!(base_url = %base_url, custom_headers = headers.len(), "built App Center client");

        Ok(Client {
            http,
            token: self.token,
            token_header,
            base_url,
            headers,
            observer: self.observer,
            poll: self.poll,
        })
    }
}

impl Client {
    /// Start building a client for the given API token
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: Vec::new(),
            observer: None,
            poll: PollOptions::default(),
        }
    }

    /// Client against the public API with default settings
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::builder(token).build()
    }

    /// Scope requests to one app
    pub fn app(&self, owner: impl Into<String>, name: impl Into<String>) -> App {
        App::new(self.clone(), owner, name)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn poll_options(&self) -> PollOptions {
        self.poll
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// Build `{base}/v0.1/apps/{owner}/{app}/{segments...}`
    pub(crate) fn api_url(&self, owner: &str, app: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppCenterError::ConfigurationError(format!(
                    "Base URL cannot be used as a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v0.1", "apps", owner, app])
            .extend(segments);
        Ok(url)
    }

    fn prepare(
        &self,
        method: Method,
        url: Url,
        content_type: &'static str,
        auth: Auth,
    ) -> RequestBuilder {
        match auth {
            Auth::ApiToken => self
                .http
                .request(method, url)
                .headers(self.headers.clone())
                .header(API_TOKEN_HEADER, self.token_header.clone())
                .header(CONTENT_TYPE, content_type),
            Auth::SignedUrl => self
                .http
                .request(method, url)
                .header(CONTENT_TYPE, content_type),
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<ApiResponse> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        if let Some(observer) = &self.observer {
            observer.on_request(&request);
        }
        debug!(%method, %url, "App Center request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if let Some(observer) = &self.observer {
            observer.on_response(&method, &url, status, &headers, &body);
        }
        debug!(%method, %url, status = status.as_u16(), "App Center response");

        Ok(ApiResponse { status, url, body })
    }

    /// Issue a JSON request and return the raw response
    ///
    /// The body, when present, is serialized as JSON. Transport failures are
    /// returned as [`AppCenterError::Http`]; any status code is a successful
    /// return.
    pub async fn request<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(method, url, body, Auth::ApiToken).await
    }

    /// Issue a JSON request to a host that authenticates through the URL
    ///
    /// Used for the upload domain, whose token travels in the query string.
    /// Neither the API token nor custom headers are sent.
    pub async fn signed_request<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(method, url, body, Auth::SignedUrl).await
    }

    async fn send_json<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        auth: Auth,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.prepare(method, url, JSON_CONTENT_TYPE, auth);
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body)?);
        }
        self.execute(builder).await
    }

    /// Send raw bytes to a pre-signed URL, e.g. an upload chunk or a symbol blob
    ///
    /// Like [`Client::signed_request`], the API token is not sent.
    pub async fn upload_bytes(
        &self,
        method: Method,
        url: Url,
        bytes: Vec<u8>,
        extra_headers: &[(&'static str, &'static str)],
    ) -> Result<ApiResponse> {
        let mut builder = self.prepare(method, url, BINARY_CONTENT_TYPE, Auth::SignedUrl);
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        self.execute(builder.body(bytes)).await
    }

    /// Request, require `expected`, decode the body as `T`
    pub async fn fetch_json<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(method, url, body)
            .await?
            .expect_status(expected)?
            .json()
    }

    /// Request and require `expected`, ignoring the body
    pub async fn send_expect<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(method, url, body).await?.expect_status(expected)
    }
}

/// Status, URL and body of a completed request
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub url: Url,
    pub body: String,
}

impl ApiResponse {
    /// Fail with [`AppCenterError::UnexpectedStatus`] unless the status matches
    pub fn expect_status(self, expected: StatusCode) -> Result<Self> {
        if self.status != expected {
            return Err(AppCenterError::UnexpectedStatus {
                status: self.status.as_u16(),
                url: self.url.to_string(),
                body: self.body,
            });
        }
        Ok(self)
    }

    /// Decode the body, keeping the raw text in the error on failure
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| AppCenterError::Decode {
            source,
            body: self.body.clone(),
        })
    }
}
