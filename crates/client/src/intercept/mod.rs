//! Request interception: route each in-scope request through a strategy.
//!
//! ```text
//! request ─► scope check ─► classify ─► NetworkFirst ─► network | store | offline page
//!                 │                  └► CacheFirst   ─► store | network | offline page
//!                 └─ out of scope ─► passthrough
//! ```
//!
//! No error escapes an in-scope request: transport and store failures are
//! logged and turned into store lookups or the offline page.

mod cache_first;
mod network_first;

use std::sync::Arc;

use pwa_offline_core::{AppConfig, CacheDb, Error, FetchRequest, Response, Strategy, StrategySelector, offline_response};
use serde::Serialize;

use crate::fetch::{Network, Scope};

/// Where a delivered response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    Fallback,
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseSource::Network => write!(f, "network"),
            ResponseSource::Cache => write!(f, "cache"),
            ResponseSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// The terminal state of an intercepted request.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub response: Response,
    pub source: ResponseSource,
    pub strategy: Strategy,
}

impl Outcome {
    fn new(response: Response, source: ResponseSource, strategy: Strategy) -> Self {
        Self { response, source, strategy }
    }

    /// The offline page, freshly built.
    pub fn fallback(strategy: Strategy) -> Self {
        Self::new(offline_response(), ResponseSource::Fallback, strategy)
    }
}

/// Result of offering a request to the interceptor.
#[derive(Debug, Clone)]
pub enum Interception {
    /// Not ours: the host performs the request with default behavior.
    Passthrough,
    /// Answered by a strategy.
    Respond(Outcome),
}

impl Interception {
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Interception::Passthrough => None,
            Interception::Respond(outcome) => Some(outcome),
        }
    }
}

/// Executes the freshness strategies against the active store and the network.
pub struct Interceptor<N: Network> {
    network: Arc<N>,
    db: CacheDb,
    cache_name: String,
    selector: StrategySelector,
    scope: Scope,
}

impl<N: Network + 'static> Interceptor<N> {
    pub fn new(
        network: Arc<N>, db: CacheDb, cache_name: impl Into<String>, selector: StrategySelector, scope: Scope,
    ) -> Self {
        Self { network, db, cache_name: cache_name.into(), selector, scope }
    }

    /// Build an interceptor for the configured version, origin and rules.
    pub fn from_config(network: Arc<N>, db: CacheDb, config: &AppConfig) -> Result<Self, Error> {
        let scope = Scope::new(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self::new(network, db, config.cache_name(), config.selector(), scope))
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Offer a request. Out-of-scope requests are never read from or written
    /// to the store.
    pub async fn respond(&self, request: FetchRequest) -> Interception {
        if !self.scope.contains(&request.url) {
            tracing::trace!("passthrough {} {}", request.method, request.url);
            return Interception::Passthrough;
        }

        let outcome = match self.classify(&request) {
            Strategy::NetworkFirst => self.network_first(&request).await,
            Strategy::CacheFirst => self.cache_first(&request).await,
        };

        Interception::Respond(outcome)
    }

    /// Strategy the request's path selects.
    pub fn classify(&self, request: &FetchRequest) -> Strategy {
        self.selector.classify(request.path())
    }

    /// Store lookup where a failing store reads as a miss.
    async fn lookup(&self, request: &FetchRequest) -> Option<Response> {
        match self.db.cache(&self.cache_name).match_request(request).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(path = request.path(), error = %e, "store lookup failed");
                None
            }
        }
    }

    /// Write and wait for completion. Failures are logged only.
    async fn store(&self, request: &FetchRequest, response: &Response) {
        write_entry(self.db.cache(&self.cache_name), request, response).await;
    }

    /// Write on a detached task; the caller does not wait for it.
    ///
    /// Concurrent writes to the same identity race and the last one wins.
    fn store_detached(&self, request: &FetchRequest, response: &Response) {
        let cache = self.db.cache(&self.cache_name);
        let request = request.clone();
        let response = response.clone();
        tokio::spawn(async move {
            write_entry(cache, &request, &response).await;
        });
    }

    fn fallback(&self, request: &FetchRequest, strategy: Strategy) -> Outcome {
        tracing::warn!(path = request.path(), %strategy, "no network and no stored copy, serving offline page");
        Outcome::fallback(strategy)
    }
}

async fn write_entry(cache: pwa_offline_core::Cache, request: &FetchRequest, response: &Response) {
    match cache.put(request, response).await {
        Ok(()) => tracing::debug!(path = request.path(), store = cache.name(), "stored response"),
        Err(e) => tracing::warn!(path = request.path(), error = %e, "failed to store response"),
    }
}
