//! MCP server integration (Streamable HTTP + stdio) for office-mcp-gateway.
//!
//! - `GatewaySvc` answers `tools/list` and `tools/call` from an explicit [`ToolRegistry`]
//! - Registry lookups, argument validation and upstream calls stay out of the rmcp types;
//!   this file only maps between them
//! - Tool failures come back as a normal result with `isError: true`; only unknown tools
//!   and invalid arguments become JSON-RPC errors

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool as McpTool, ToolAnnotations,
    },
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler,
};

use crate::domain::ToolError;
use crate::infra::config::Config;
use crate::tools::registry::{build_registry, DispatchError, ToolMeta, ToolRegistry};

pub const SERVER_NAME: &str = "office-mcp-gateway";

/// The MCP server handler. Cheap to clone; every clone shares one registry.
#[derive(Clone)]
pub struct GatewaySvc {
    registry: Arc<ToolRegistry>,
}

impl GatewaySvc {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Tool descriptors as advertised on `tools/list`.
    pub fn tools(&self) -> Vec<McpTool> {
        self.registry.list().into_iter().map(to_mcp_tool).collect()
    }

    /// Route one `tools/call` through the registry.
    pub async fn dispatch(&self, name: &str, args: JsonObject) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = name, "tools/call");
        match self.registry.call(name, &args).await {
            Ok(out) => Ok(out.into()),
            Err(DispatchError::UnknownTool(name)) => {
                tracing::warn!(tool = %name, "unknown tool requested");
                Err(McpError::invalid_params(format!("unknown tool: {name}"), None))
            }
            Err(DispatchError::Tool(ToolError::InvalidParams(msg))) => {
                tracing::debug!(tool = name, error = %msg, "rejected tool arguments");
                Err(McpError::invalid_params(msg, None))
            }
        }
    }
}

fn to_mcp_tool(meta: ToolMeta) -> McpTool {
    let schema = match meta.input_schema {
        serde_json::Value::Object(obj) => obj,
        _ => JsonObject::new(),
    };
    let mut tool = McpTool::new(meta.name, meta.description, Arc::new(schema));
    tool.annotations = Some(ToolAnnotations {
        title: Some(meta.title.to_string()),
        open_world_hint: Some(true),
        ..Default::default()
    });
    tool
}

impl ServerHandler for GatewaySvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Tools: send_email (via Resend), search_emails (email archive), \
                 create_appointment (appointment service)."
                    .to_string(),
            ),
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
        self.dispatch(&request.name, request.arguments.unwrap_or_default()).await
    }
}

/// Build the handler from configuration; the registry is shared by every session.
pub fn svc_from_config(cfg: &Config) -> GatewaySvc {
    GatewaySvc::new(Arc::new(build_registry(cfg)))
}
