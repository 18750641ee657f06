//! sw_status tool implementation.
//!
//! Reports the lifecycle state and the stores that currently exist.

use pwa_offline_client::{LifecycleState, Network, Worker};
use pwa_offline_core::{CacheDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    pub active: bool,
}

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize)]
pub struct SwStatusOutput {
    pub state: LifecycleState,
    pub cache_name: String,
    pub stores: Vec<StoreSummary>,
    pub clients: usize,
}

/// Implementation of the sw_status tool.
pub async fn status_impl<N: Network + 'static>(worker: &Worker<N>, db: &CacheDb) -> Result<CallToolResult, McpError> {
    let mut stores = Vec::new();
    for name in db.cache_names().await? {
        let entries = db.cache(&name).len().await?;
        let active = name == worker.cache_name();
        stores.push(StoreSummary { name, entries, active });
    }

    let output = SwStatusOutput {
        state: worker.state().await,
        cache_name: worker.cache_name().to_string(),
        stores,
        clients: worker.clients().len().await,
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{FixedNetwork, text_of, worker_with};

    #[tokio::test]
    async fn test_status_after_start() {
        let (worker, _network, db) = worker_with(FixedNetwork::online("x")).await;

        let result = status_impl(&worker, &db).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();

        assert_eq!(value["state"], "activated");
        assert_eq!(value["cache_name"], "pwa-cache-v1.0.3");
        assert_eq!(value["stores"].as_array().unwrap().len(), 1);
        assert_eq!(value["stores"][0]["active"], true);
        assert_eq!(value["stores"][0]["entries"], 0);
    }
}
