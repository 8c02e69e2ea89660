//! The `query_perplexity` tool and the MCP handler that serves it.
//!
//! Two error classes leave this module:
//! - protocol errors (`ErrorData`) for an unknown tool name or bad arguments;
//! - tool errors, carried inside a normal `CallToolResult` with `isError: true`.

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorCode, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler,
};

use crate::clients::perplexity::PerplexityRemote;
use crate::core::error::GatewayError;
use crate::core::tool::{schema_object, ToolSpec};
use crate::domain::{AnswerEngine, InvalidCall, QueryRequest, QUERY_TOOL_NAME};
use crate::infra::config::PerplexityConfig;

pub const SERVER_NAME: &str = "perplexity-server";

#[derive(Clone, Copy, Default)]
pub struct QueryPerplexityTool;

impl ToolSpec for QueryPerplexityTool {
    fn name(&self) -> &'static str {
        QUERY_TOOL_NAME
    }
    fn description(&self) -> &'static str {
        "Sends a query to the Perplexity API and returns the response."
    }
    fn input_schema(&self) -> JsonObject {
        schema_object(serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "The prompt/question to send to Perplexity."
                }
            },
            "required": ["prompt"]
        }))
    }
}

/// The MCP server handler. Holds whichever [`AnswerEngine`] it is given at boot.
#[derive(Clone)]
pub struct PerplexitySvc {
    engine: Arc<dyn AnswerEngine>,
    descriptor: Tool,
}

impl PerplexitySvc {
    pub fn new(engine: Arc<dyn AnswerEngine>) -> Self {
        Self {
            engine,
            descriptor: QueryPerplexityTool.descriptor(),
        }
    }

    pub fn from_config(cfg: &PerplexityConfig) -> Result<Self, GatewayError> {
        let remote = PerplexityRemote::from_config(cfg)?;
        Ok(Self::new(Arc::new(remote)))
    }

    pub fn tools(&self) -> Vec<Tool> {
        vec![self.descriptor.clone()]
    }

    /// Validate, query, and wrap. Only validation failures become protocol errors.
    pub async fn invoke(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = %request.name, "tools/call invoked");
        let query = QueryRequest::from_call(&request.name, request.arguments.as_ref())
            .map_err(invalid_call_to_mcp)?;

        match self.engine.ask(query.prompt()).await {
            Ok(reply) => {
                if reply.is_failure() {
                    tracing::warn!(tool = QUERY_TOOL_NAME, "returning error-flagged result");
                }
                Ok(reply.into())
            }
            Err(e) => {
                tracing::error!(error = %e, "Error calling queryPerplexity");
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "Error processing Perplexity query: {e}"
                ))]))
            }
        }
    }
}

fn invalid_call_to_mcp(err: InvalidCall) -> McpError {
    tracing::warn!(error = %err, "rejected tools/call");
    match err {
        InvalidCall::UnknownTool(_) => McpError::new(ErrorCode::METHOD_NOT_FOUND, err.to_string(), None),
        InvalidCall::InvalidArguments => McpError::invalid_params(err.to_string(), None),
    }
}

impl ServerHandler for PerplexitySvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(request).await
    }
}
