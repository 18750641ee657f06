//! MCP server handler implementation.
//!
//! This module defines the host handler that routes tool calls to the
//! deployed worker and its stores.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, get_impl};
use crate::tools::{SwFetchParams, SwMessageParams, fetch_impl, message_impl, status_impl};

use pwa_offline_client::{HttpNetwork, Worker};
use pwa_offline_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for pwa-offline.
#[derive(Clone)]
pub struct PwaOfflineServer {
    tool_router: ToolRouter<Self>,
    worker: Arc<Worker<HttpNetwork>>,
    network: Arc<HttpNetwork>,
    db: CacheDb,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl PwaOfflineServer {
    /// Create a new server handler around a started worker.
    pub fn new(worker: Arc<Worker<HttpNetwork>>, network: Arc<HttpNetwork>, db: CacheDb) -> Self {
        Self { tool_router: Self::tool_router(), worker, network, db }
    }

    /// Issue a page request through the worker.
    ///
    /// Same-origin requests are answered network-first or cache-first depending on the path.
    /// Everything else goes to the network untouched.
    #[tool(
        description = "Fetch a URL as a page of the application would. Returns the response and whether it came from the network, the cache or the offline fallback."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&*self.worker, &*self.network, params.0).await
    }

    #[tool(description = "Post a control message to the worker, e.g. {\"type\": \"SKIP_WAITING\"}.")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&*self.worker, params.0).await
    }

    #[tool(description = "Report the worker lifecycle state, the active store and every store with its entry count.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&*self.worker, &self.db).await
    }

    /// Read a stored response from the active store.
    ///
    /// Returns a CACHE_MISS error if nothing is stored for the URL.
    #[tool(description = "Read the response stored for a URL in the active store.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&*self.worker, &self.db, params.0).await
    }
}

impl ServerHandler for PwaOfflineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pwa-offline".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
