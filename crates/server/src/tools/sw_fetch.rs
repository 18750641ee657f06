//! sw_fetch tool implementation.
//!
//! Issues a page request through the worker. Requests the worker does not
//! intercept go straight to the network.

use std::collections::BTreeMap;

use pwa_offline_client::{Interception, Network, Worker};
use pwa_offline_core::{Error, Response, Strategy};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::request::{build_request, header_pairs};

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path relative to the application origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Identifier of the issuing page instance.
    #[serde(default)]
    pub client_id: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// The requested URL after resolution.
    pub url: String,
    /// "network", "cache", "fallback" or "passthrough".
    pub source: String,
    /// Strategy used, absent for passthrough requests.
    pub strategy: Option<Strategy>,
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

impl SwFetchOutput {
    fn new(url: String, source: String, strategy: Option<Strategy>, response: &Response) -> Self {
        Self {
            url,
            source,
            strategy,
            status: response.status.as_u16(),
            status_text: response.status_text().to_string(),
            content_type: response.content_type().map(str::to_string),
            headers: header_pairs(response),
            body: String::from_utf8_lossy(&response.body).to_string(),
            body_bytes: response.body.len(),
        }
    }
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl<N: Network + 'static>(
    worker: &Worker<N>, network: &N, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let request = build_request(worker.scope(), &params.url, &params.method, &params.headers)?;
    let url = request.url.to_string();

    let output = match worker.handle(params.client_id.as_deref(), request.clone()).await {
        Interception::Respond(outcome) => {
            SwFetchOutput::new(url, outcome.source.to_string(), Some(outcome.strategy), &outcome.response)
        }
        Interception::Passthrough => {
            tracing::debug!("not intercepted, fetching {} directly", url);
            let response = network.fetch(&request).await?;
            SwFetchOutput::new(url, "passthrough".into(), None, &response)
        }
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
