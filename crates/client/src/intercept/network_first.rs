//! Network-first: live fetch, then the store, then the offline page.

use pwa_offline_core::{FetchRequest, Strategy};

use super::{Interceptor, Outcome, ResponseSource};
use crate::fetch::Network;

impl<N: Network + 'static> Interceptor<N> {
    pub(super) async fn network_first(&self, request: &FetchRequest) -> Outcome {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_storable() {
                    tracing::debug!(path = request.path(), "network-first: refreshing stored copy");
                    self.store_detached(request, &response);
                }
                Outcome::new(response, ResponseSource::Network, Strategy::NetworkFirst)
            }
            Err(e) => {
                tracing::warn!(path = request.path(), error = %e, "network failed, trying store");
                match self.lookup(request).await {
                    Some(stored) => {
                        tracing::debug!(path = request.path(), "network-first: served stored copy");
                        Outcome::new(stored, ResponseSource::Cache, Strategy::NetworkFirst)
                    }
                    None => self.fallback(request, Strategy::NetworkFirst),
                }
            }
        }
    }
}
