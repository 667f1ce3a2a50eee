//! Async API client for the Pet, Store, User and Company resources.
//!
//! # Overview
//! Every operation runs through one small pipeline: validate and expand the
//! path template, serialize query parameters, merge per-call overrides onto
//! the client defaults, attach credentials, dispatch through an
//! `HttpExecutor`, and normalize any failure into a `NormalizedError`.
//!
//! # Design
//! - Request construction is pure. Each resource exposes a `build_*` method
//!   per operation so requests can be inspected without a network.
//! - `Transport` is the only place requests are sent and errors normalized;
//!   resource clients and `ApiClient` just share an `Arc<Transport>`.
//! - Credentials live in an injected `CredentialStore`; the auth interceptor
//!   reads it per request and clears it on 401.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod path;
pub mod query;
pub mod request;
pub mod resources;
pub mod transport;
pub mod types;

pub use auth::{AuthConfig, Authenticator, CredentialStore, MemoryCredentialStore};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{with_error_handling, ApiError, NormalizedError, TransportError};
pub use http::{FilePart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
pub use path::PathParams;
pub use query::{PaginationParams, QueryParams, QueryValue, SortOrder, SortParams};
pub use request::RequestOptions;
pub use resources::{CompanyApi, PetApi, StoreApi, UserApi};
pub use transport::{HttpExecutor, ReqwestExecutor, Transport};
pub use types::*;
