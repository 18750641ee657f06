//! sw_message tool implementation.
//!
//! Posts a control message to the worker, as a page would.

use pwa_offline_client::{LifecycleState, MessageOutcome, Network, Worker};
use pwa_offline_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// Message payload, e.g. `{"type": "SKIP_WAITING"}`.
    pub message: serde_json::Value,
}

/// Output from the sw_message tool.
#[derive(Debug, Clone, Serialize)]
pub struct SwMessageOutput {
    pub outcome: MessageOutcome,
    /// Lifecycle state after the message was handled.
    pub state: LifecycleState,
}

/// Implementation of the sw_message tool.
pub async fn message_impl<N: Network + 'static>(
    worker: &Worker<N>, params: SwMessageParams,
) -> Result<CallToolResult, McpError> {
    let outcome = worker.on_message(&params.message).await?;
    let output = SwMessageOutput { outcome, state: worker.state().await };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
