//! Request and response values passed between the page, the worker and the network.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use url::Url;

/// A request issued by a page instance.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl FetchRequest {
    /// A plain GET with no headers.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, headers: HeaderMap::new() }
    }

    /// Attach a header, replacing any existing value.
    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Path component of the request URL.
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// A response delivered to a page: live, replayed from a store, or synthesized.
#[derive(Debug, Clone)]
pub struct Response {
    /// URL the response was produced for; `None` for synthesized responses.
    pub url: Option<Url>,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { url: None, status, headers: HeaderMap::new(), body: body.into() }
    }

    /// Reason phrase for the status, e.g. `Service Unavailable`.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Content-Type header, if present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Only status 200 responses are persisted.
    pub fn is_storable(&self) -> bool {
        self.status == StatusCode::OK
    }
}
