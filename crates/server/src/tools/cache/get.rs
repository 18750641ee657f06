//! cache_get tool implementation.
//!
//! Reads the entry stored for a URL in the active version's store.

use std::collections::BTreeMap;

use pwa_offline_client::{Network, Worker};
use pwa_offline_core::{CacheDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::request::build_request;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path relative to the application origin.
    pub url: String,

    /// Request headers, relevant when the stored response has a `Vary` header.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    pub url: String,
    pub key_hash: String,
    pub status: u16,
    pub stored_at: String,
    /// Header values decoded as UTF-8 (lossy).
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl<N: Network + 'static>(
    worker: &Worker<N>, db: &CacheDb, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let request = build_request(worker.scope(), &params.url, "GET", &params.headers)?;
    let store = db.cache(worker.cache_name());

    let entry = store
        .match_stored(&request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.url.to_string()))?;

    let output = CacheGetOutput {
        store: store.name().to_string(),
        url: entry.url,
        key_hash: entry.key_hash,
        status: entry.status,
        stored_at: entry.stored_at,
        headers: entry
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), String::from_utf8_lossy(value).to_string()))
            .collect(),
        body: String::from_utf8_lossy(&entry.body).to_string(),
        body_bytes: entry.body.len(),
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize entry: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
