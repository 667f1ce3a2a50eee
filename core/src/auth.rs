//! Authentication interceptor and credential storage.
//!
//! # Design
//! Credentials live in an injected `CredentialStore` rather than global
//! state, so tests can swap in their own store. The `Authenticator` reads
//! the store on every outgoing request and only ever clears it, after a 401.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::http::HttpRequest;

pub const DEFAULT_TOKEN_KEY: &str = "auth_token";
pub const DEFAULT_PASSWORD_KEY: &str = "auth_password";
pub const DEFAULT_API_KEY_KEY: &str = "api_key";
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
pub const AUTHORIZATION: &str = "Authorization";

/// Key-value string storage for credentials.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    /// Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// In-process credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
    }
}

/// User-supplied request rewrite.
pub type RequestTransform = Arc<dyn Fn(HttpRequest) -> HttpRequest + Send + Sync>;

/// The active authentication scheme.
#[derive(Clone)]
pub enum AuthConfig {
    /// `Authorization: Bearer <token>`.
    Bearer { token_key: String },
    /// `<header_name>: <token>`.
    ApiKey { header_name: String, token_key: String },
    /// `Authorization: Basic base64(<token>:<password>)`; the token is the
    /// username.
    Basic { token_key: String, password_key: String },
    /// Delegates entirely to the transform.
    Custom(RequestTransform),
}

impl AuthConfig {
    pub fn bearer() -> Self {
        AuthConfig::Bearer {
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }

    pub fn api_key() -> Self {
        AuthConfig::ApiKey {
            header_name: DEFAULT_API_KEY_HEADER.to_string(),
            token_key: DEFAULT_API_KEY_KEY.to_string(),
        }
    }

    pub fn basic() -> Self {
        AuthConfig::Basic {
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            password_key: DEFAULT_PASSWORD_KEY.to_string(),
        }
    }

    pub fn custom<F>(transform: F) -> Self
    where
        F: Fn(HttpRequest) -> HttpRequest + Send + Sync + 'static,
    {
        AuthConfig::Custom(Arc::new(transform))
    }

    /// Store keys cleared after a 401.
    fn stored_keys(&self) -> Vec<&str> {
        match self {
            AuthConfig::Bearer { token_key } | AuthConfig::ApiKey { token_key, .. } => {
                vec![token_key.as_str()]
            }
            AuthConfig::Basic {
                token_key,
                password_key,
            } => vec![token_key.as_str(), password_key.as_str()],
            AuthConfig::Custom(_) => Vec::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig::bearer()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Bearer { token_key } => {
                f.debug_struct("Bearer").field("token_key", token_key).finish()
            }
            AuthConfig::ApiKey {
                header_name,
                token_key,
            } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("token_key", token_key)
                .finish(),
            AuthConfig::Basic {
                token_key,
                password_key,
            } => f
                .debug_struct("Basic")
                .field("token_key", token_key)
                .field("password_key", password_key)
                .finish(),
            AuthConfig::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Attaches credentials to outgoing requests and invalidates them on 401.
#[derive(Clone)]
pub struct Authenticator {
    scheme: Option<AuthConfig>,
    store: Arc<dyn CredentialStore>,
    request_hook: Option<RequestTransform>,
}

impl Authenticator {
    pub fn new(
        scheme: Option<AuthConfig>,
        store: Arc<dyn CredentialStore>,
        request_hook: Option<RequestTransform>,
    ) -> Self {
        Self {
            scheme,
            store,
            request_hook,
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Attach the configured credential, then run the request hook. A
    /// missing or empty token leaves the request unauthenticated.
    pub fn apply(&self, mut request: HttpRequest) -> HttpRequest {
        match &self.scheme {
            Some(AuthConfig::Custom(transform)) => return transform(request),
            Some(AuthConfig::Bearer { token_key }) => {
                if let Some(token) = self.credential(token_key) {
                    request.set_header(AUTHORIZATION, format!("Bearer {token}"));
                }
            }
            Some(AuthConfig::ApiKey {
                header_name,
                token_key,
            }) => {
                if let Some(token) = self.credential(token_key) {
                    request.set_header(header_name, token);
                }
            }
            Some(AuthConfig::Basic {
                token_key,
                password_key,
            }) => {
                if let Some(username) = self.credential(token_key) {
                    let password = self.store.get(password_key).unwrap_or_default();
                    let encoded = BASE64.encode(format!("{username}:{password}"));
                    request.set_header(AUTHORIZATION, format!("Basic {encoded}"));
                }
            }
            None => {}
        }

        match &self.request_hook {
            Some(hook) => hook(request),
            None => request,
        }
    }

    fn credential(&self, key: &str) -> Option<String> {
        self.store.get(key).filter(|value| !value.is_empty())
    }

    /// Clear stored credentials after a 401. Safe to call repeatedly.
    pub fn on_unauthorized(&self) {
        let Some(scheme) = &self.scheme else {
            return;
        };
        for key in scheme.stored_keys() {
            self.store.remove(key);
        }
        tracing::warn!("Unauthorized access - please login again");
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("scheme", &self.scheme)
            .field("request_hook", &self.request_hook.is_some())
            .finish_non_exhaustive()
    }
}

pub fn set_bearer_token(store: &dyn CredentialStore, token: &str, key: Option<&str>) {
    store.set(key.unwrap_or(DEFAULT_TOKEN_KEY), token);
}

pub fn set_api_key(store: &dyn CredentialStore, api_key: &str, key: Option<&str>) {
    store.set(key.unwrap_or(DEFAULT_API_KEY_KEY), api_key);
}

pub fn set_basic_auth(store: &dyn CredentialStore, username: &str, password: &str) {
    store.set(DEFAULT_TOKEN_KEY, username);
    store.set(DEFAULT_PASSWORD_KEY, password);
}

/// Remove `keys`, or every default credential key when `None`.
pub fn remove_auth(store: &dyn CredentialStore, keys: Option<&[&str]>) {
    let defaults = [DEFAULT_TOKEN_KEY, DEFAULT_API_KEY_KEY, DEFAULT_PASSWORD_KEY];
    for key in keys.unwrap_or(&defaults[..]) {
        store.remove(key);
    }
}
