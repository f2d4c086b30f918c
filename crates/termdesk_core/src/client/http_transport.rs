//! Blocking HTTP transport.
//!
//! # Invariants
//! - One `reqwest` client per transport; its cookie store carries the
//!   session cookie across requests.
//! - No retries. Transport errors are reported once, as `ApiError::Transport`.

use super::{ApiError, ApiResult, Transport};
use crate::session::CSRF_HEADER;
use crate::wire::{ApiRequest, ApiResponse};
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Instant;
use url::Url;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Sends requests to a remote resource endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport rooted at `base_url` (scheme + host, optional prefix).
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ApiError::Transport(format!("invalid base url `{base_url}`: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!(
                "base url `{base_url}` cannot carry a path"
            )));
        }
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for a resource path and raw query string.
    pub fn url_for(&self, path: &str, query: &str) -> String {
        let mut url = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let started_at = Instant::now();
        let url = self.url_for(&request.path, &request.query);

        let mut builder = self
            .client
            .request(request.method.clone(), url.as_str())
            .header(ACCEPT, JSON_MEDIA_TYPE);
        if let Some(token) = request.csrf_token.as_deref() {
            builder = builder.header(CSRF_HEADER, token);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, JSON_MEDIA_TYPE).body(body);
        }

        let response = builder.send().map_err(|err| {
            warn!(
                "event=http_request module=client status=error method={} path={} error={}",
                request.method, request.path, err
            );
            ApiError::Transport(err.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| ApiError::Transport(format!("failed to read response body: {err}")))?;

        debug!(
            "event=http_request module=client status=ok method={} path={} http_status={} duration_ms={}",
            request.method,
            request.path,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );

        Ok(ApiResponse {
            status,
            body: if body.is_empty() { None } else { Some(body) },
        })
    }
}
