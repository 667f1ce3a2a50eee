//! Request configuration builder.
//!
//! Merges the client defaults, per-call overrides and serialized query
//! parameters into a fresh `HttpRequest`. Construction is pure: the
//! defaults are only read, and absent or empty optional inputs simply have
//! no effect.

use std::time::Duration;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{upsert_header, HttpMethod, HttpRequest, MultipartForm, RequestBody};
use crate::query::{serialize, QueryParams};

/// Per-call overrides. Headers merge key-wise over the defaults; the other
/// fields replace the default wholesale when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub base_url: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        upsert_header(&mut self.headers, name, value.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }
}

/// Build the descriptor for one call.
pub fn build_request(
    config: &ClientConfig,
    method: HttpMethod,
    path: String,
    query: Option<&QueryParams>,
    overrides: Option<&RequestOptions>,
) -> HttpRequest {
    let mut headers = config.headers.clone();
    let mut timeout = config.timeout;
    let mut base_url = config.base_url.clone();

    if let Some(overrides) = overrides {
        for (name, value) in &overrides.headers {
            upsert_header(&mut headers, name, value.clone());
        }
        if let Some(t) = overrides.timeout {
            timeout = t;
        }
        if let Some(url) = &overrides.base_url {
            base_url = url.trim_end_matches('/').to_string();
        }
    }

    HttpRequest {
        method,
        base_url,
        path,
        query: query.map(serialize).unwrap_or_default(),
        headers,
        body: None,
        timeout,
    }
}

/// Attach a JSON-encoded body.
pub fn with_json_body<T: Serialize + ?Sized>(mut request: HttpRequest, body: &T) -> Result<HttpRequest, ApiError> {
    let json = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
    request.body = Some(RequestBody::Json(json));
    Ok(request)
}

/// Attach a multipart body. The JSON content type default is dropped so the
/// executor can set the multipart boundary.
pub fn with_multipart_body(mut request: HttpRequest, form: MultipartForm) -> HttpRequest {
    request.remove_header(crate::config::CONTENT_TYPE);
    request.body = Some(RequestBody::Multipart(form));
    request
}
