//! Network transport used by the worker.
//!
//! The worker only needs "fetch a request, get back a response or a
//! transport failure". Non-success statuses are responses, not errors.
//!
//! ### URL Handling
//! - Relative references resolve against the application origin
//! - Fragments are removed, query strings are preserved
//!
//! ### Scope
//! - Only same-origin `http`/`https` requests are intercepted

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

pub use self::url::{Scope, UrlError, resolve};

use pwa_offline_core::{AppConfig, Error, FetchRequest, Response};

/// The network primitive the interceptor runs strategies against.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform `request`. `Err` means no response was received at all.
    async fn fetch(&self, request: &FetchRequest) -> Result<Response, Error>;
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "pwa-offline/0.1")
    pub user_agent: String,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 20)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "pwa-offline/0.1".to_string(), timeout: None, max_redirects: 20 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), max_redirects: config.max_redirects }
    }
}

/// reqwest-backed [`Network`].
pub struct HttpNetwork {
    http: Client,
    config: FetchConfig,
}

impl HttpNetwork {
    /// Create a new transport with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<Response, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.as_str())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} {}: {}", request.method, request.url, e)))?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {}", e)))?;

        tracing::debug!(
            "fetched {} -> {} {} in {}ms ({} bytes, {})",
            request.url,
            final_url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len(),
            headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("no content-type")
        );

        Ok(Response { url: Some(final_url), status, headers, body })
    }
}
