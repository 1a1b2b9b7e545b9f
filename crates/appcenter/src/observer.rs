//! Request/response observers
//!
//! An observer is handed to the [`Client`](crate::Client) at construction
//! and sees every request before it is sent and every response after its
//! body is read. [`TracingObserver`] dumps both through `tracing`.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tracing::debug;
use url::Url;

use crate::client::API_TOKEN_HEADER;

/// Hook for inspecting HTTP traffic
pub trait HttpObserver: Send + Sync {
    /// Called just before a request is sent
    fn on_request(&self, request: &reqwest::Request);

    /// Called once the response body has been read
    fn on_response(
        &self,
        method: &Method,
        url: &Url,
        status: StatusCode,
        headers: &HeaderMap,
        body: &str,
    );
}

/// Dumps requests and responses at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl HttpObserver for TracingObserver {
    fn on_request(&self, request: &reqwest::Request) {
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|bytes| render_body(request.headers(), bytes))
            .unwrap_or_default();

        debug!(
            method = %request.method(),
            url = %request.url(),
            headers = %render_headers(request.headers()),
            body = %body,
            "HTTP request dump"
        );
    }

    fn on_response(
        &self,
        method: &Method,
        url: &Url,
        status: StatusCode,
        headers: &HeaderMap,
        body: &str,
    ) {
        debug!(
            %method,
            %url,
            status = status.as_u16(),
            headers = %render_headers(headers),
            body = %body,
            "HTTP response dump"
        );
    }
}

/// One `name: value` line per header, with the API token masked
pub fn render_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name.as_str().eq_ignore_ascii_case(API_TOKEN_HEADER) {
                "<redacted>".to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            format!("{}: {}", name, value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Body text, or just its length for binary uploads
fn render_body(headers: &HeaderMap, bytes: &[u8]) -> String {
    let is_binary = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/octet-stream"));

    if is_binary {
        format!("<{} bytes>", bytes.len())
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
