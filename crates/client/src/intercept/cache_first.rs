//! Cache-first: the store, then a live fetch that populates it.

use pwa_offline_core::{FetchRequest, Strategy};

use super::{Interceptor, Outcome, ResponseSource};
use crate::fetch::Network;

impl<N: Network + 'static> Interceptor<N> {
    pub(super) async fn cache_first(&self, request: &FetchRequest) -> Outcome {
        if let Some(stored) = self.lookup(request).await {
            tracing::debug!(path = request.path(), "cache-first: hit");
            return Outcome::new(stored, ResponseSource::Cache, Strategy::CacheFirst);
        }

        tracing::debug!(path = request.path(), "cache-first: miss, fetching");
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_storable() {
                    self.store(request, &response).await;
                }
                Outcome::new(response, ResponseSource::Network, Strategy::CacheFirst)
            }
            Err(e) => {
                tracing::warn!(path = request.path(), error = %e, "cache-first: fetch failed");
                self.fallback(request, Strategy::CacheFirst)
            }
        }
    }
}
