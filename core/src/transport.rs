//! Shared transport: defaults, authentication and request dispatch.
//!
//! # Design
//! `Transport` owns everything a call needs besides its own inputs: the
//! client defaults, the `Authenticator` and an `HttpExecutor` that performs
//! the network round-trip. Each call builds its own `HttpRequest`, so one
//! transport can serve any number of concurrent calls. Failures are
//! normalized here, once, before they reach an operation.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{Authenticator, CredentialStore, MemoryCredentialStore};
use crate::config::ClientConfig;
use crate::error::{
    normalize_decode_error, normalize_response, normalize_transport_error, ApiError, NormalizedError, TransportError,
};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::query::QueryParams;
use crate::request::{build_request, RequestOptions};

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Performs one HTTP round-trip. Any received response, whatever its status,
/// is `Ok`; `Err` means no response was received.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default executor backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, request.url())
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Json(json)) => builder.body(json),
            Some(RequestBody::Multipart(form)) => builder.multipart(to_reqwest_form(form)?),
            None => builder,
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn to_reqwest_form(form: crate::http::MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
    let mut out = reqwest::multipart::Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }
    for file in form.files {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| TransportError {
                code: Some("ERR_BAD_REQUEST_BODY".to_string()),
                message: e.to_string(),
                timed_out: false,
            })?;
        out = out.part(file.field_name, part);
    }
    Ok(out)
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::timeout(err.to_string())
    } else {
        TransportError::network(err.to_string())
    }
}

/// The shared request pipeline used by every resource client.
#[derive(Clone)]
pub struct Transport {
    config: ClientConfig,
    authenticator: Authenticator,
    executor: Arc<dyn HttpExecutor>,
}

impl Transport {
    /// Transport with an in-memory credential store and the reqwest executor.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(ReqwestExecutor::new()),
        )
    }

    pub fn with_parts(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        executor: Arc<dyn HttpExecutor>,
    ) -> Self {
        let authenticator = Authenticator::new(config.auth.clone(), store, config.request_hook.clone());
        Self {
            config,
            authenticator,
            executor,
        }
    }

    /// Process-wide default transport, created on first use from
    /// `ClientConfig::from_env`.
    pub fn shared() -> Arc<Transport> {
        static SHARED: OnceLock<Arc<Transport>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(Transport::new(ClientConfig::from_env())))
            .clone()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.authenticator.store().as_ref()
    }

    /// Start a descriptor from the transport defaults.
    pub fn request(
        &self,
        method: HttpMethod,
        path: String,
        query: Option<&QueryParams>,
        options: Option<&RequestOptions>,
    ) -> HttpRequest {
        build_request(&self.config, method, path, query, options)
    }

    /// Authenticate, dispatch and normalize. Only 2xx responses are `Ok`.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut request = self.authenticator.apply(request);
        if request.header(REQUEST_ID_HEADER).is_none() {
            request.set_header(REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string());
        }

        let method = request.method.as_str();
        let url = request.url();
        debug!(%method, %url, "sending request");

        let response = match self.executor.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(%method, %url, error = %err, "no response received");
                return Err(self.reject(normalize_transport_error(&err)));
            }
        };
        debug!(%method, %url, status = response.status, "received response");

        if response.is_success() {
            return Ok(match &self.config.response_hook {
                Some(hook) => hook(response),
                None => response,
            });
        }
        if response.status == 401 {
            self.authenticator.on_unauthorized();
        }
        Err(self.reject(normalize_response(&response)))
    }

    /// Pass a normalized failure through the configured error hook.
    fn reject(&self, err: NormalizedError) -> ApiError {
        match &self.config.error_hook {
            Some(hook) => hook(err).into(),
            None => err.into(),
        }
    }

    /// `send`, then decode the body as `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        decode_body(&response)
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

/// An empty body decodes as JSON `null`; text that is not JSON decodes as a
/// JSON string.
pub(crate) fn decode_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let body = response.body.trim();
    let value = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(response.body.clone()))
    };
    serde_json::from_value(value).map_err(|e| normalize_decode_error(response, &e).into())
}
