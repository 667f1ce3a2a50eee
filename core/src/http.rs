//! HTTP request and response types described as plain data.
//!
//! # Design
//! The pipeline builds `HttpRequest` values and consumes `HttpResponse`
//! values without touching the network. An `HttpExecutor` (see
//! `transport`) performs the actual round-trip, which keeps request
//! construction deterministic and easy to test.
//!
//! All fields use owned types so a descriptor can be cloned, logged and
//! handed to any executor without lifetime concerns.

use std::time::Duration;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A file attached to a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// A part sent under the conventional `file` field name.
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            field_name: "file".to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }
}

/// A `multipart/form-data` payload: plain text fields plus file parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Pre-encoded JSON text.
    Json(String),
    Multipart(MultipartForm),
}

/// An outgoing request described as plain data.
///
/// Built fresh for every call by `build_request`; the executor turns it into
/// a network round-trip and returns the corresponding `HttpResponse`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub base_url: String,
    /// Expanded path, starting with `/`.
    pub path: String,
    /// Serialized query parameters in insertion order.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Full URL including the encoded query string. No `?` is emitted for an
    /// empty query.
    pub fn url(&self) -> String {
        let mut url = format!("{}{}", self.base_url, self.path);
        if !self.query.is_empty() {
            let encoded: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&encoded.join("&"));
        }
        url
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Replace a header in place (case-insensitive match) or append it.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        upsert_header(&mut self.headers, name, value.into());
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }
}

/// A response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub(crate) fn upsert_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(slot) => slot.1 = value,
        None => headers.push((name.to_string(), value)),
    }
}
