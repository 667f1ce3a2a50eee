//! Client configuration: transport defaults, auth scheme and the request,
//! response and error hooks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthConfig, RequestTransform};
use crate::error::NormalizedError;
use crate::http::{upsert_header, HttpRequest, HttpResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.example.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

const BASE_URL_ENV: &str = "API_BASE_URL";
const TIMEOUT_ENV: &str = "API_TIMEOUT_MS";

/// Rewrite applied to every 2xx response before it is decoded.
pub type ResponseTransform = Arc<dyn Fn(HttpResponse) -> HttpResponse + Send + Sync>;

/// Rewrite applied to every normalized request failure, after 401
/// invalidation.
pub type ErrorTransform = Arc<dyn Fn(NormalizedError) -> NormalizedError + Send + Sync>;

/// Defaults every request starts from.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
    pub auth: Option<AuthConfig>,
    pub request_hook: Option<RequestTransform>,
    pub response_hook: Option<ResponseTransform>,
    pub error_hook: Option<ErrorTransform>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            auth: Some(AuthConfig::default()),
            request_hook: None,
            response_hook: None,
            error_hook: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Defaults overlaid with `API_BASE_URL` and `API_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config = config.with_base_url(&url);
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.timeout = Duration::from_millis(ms),
                Err(err) => {
                    tracing::warn!(value = %raw, error = %err, "ignoring invalid {TIMEOUT_ENV}")
                }
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add or replace a default header (case-insensitive name match).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        upsert_header(&mut self.headers, name, value.to_string());
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.auth = None;
        self
    }

    /// Hook run on every request after credentials are attached.
    pub fn with_request_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(HttpRequest) -> HttpRequest + Send + Sync + 'static,
    {
        self.request_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_response_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(HttpResponse) -> HttpResponse + Send + Sync + 'static,
    {
        self.response_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(NormalizedError) -> NormalizedError + Send + Sync + 'static,
    {
        self.error_hook = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .field("auth", &self.auth)
            .field("request_hook", &self.request_hook.is_some())
            .field("response_hook", &self.response_hook.is_some())
            .field("error_hook", &self.error_hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_generated_constants() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(
            config.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        assert!(matches!(config.auth, Some(AuthConfig::Bearer { ref token_key }) if token_key == "auth_token"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:3000/");
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn with_header_merges_key_wise() {
        let config = ClientConfig::default()
            .with_header("content-type", "text/plain")
            .with_header("Accept", "application/json");
        assert_eq!(
            config.headers,
            vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn hooks_are_unset_by_default() {
        let config = ClientConfig::default();
        assert!(config.request_hook.is_none());
        assert!(config.response_hook.is_none());
        assert!(config.error_hook.is_none());

        let config = config.with_response_hook(|r| r).with_error_hook(|e| e);
        assert!(format!("{config:?}").contains("response_hook: true"));
    }

    #[test]
    fn without_auth_clears_scheme() {
        assert!(ClientConfig::default().without_auth().auth.is_none());
    }
}
