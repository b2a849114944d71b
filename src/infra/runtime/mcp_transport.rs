//! Generic MCP transport helpers (stdio + streamable HTTP) decoupled from tool logic.

use std::sync::Arc;

use rmcp::transport::streamable_http_server::tower::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::ServiceExt;

pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
pub use rmcp::ServerHandler;

/// Serve MCP over stdin/stdout until the peer hangs up.
pub async fn serve_stdio<H>(handler: H) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    H: ServerHandler,
{
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let running = handler.serve((stdin, stdout)).await?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "stdio transport finished");
    Ok(())
}

/// Streamable HTTP service; `factory` is invoked for every new session, or for
/// every request when `stateful` is false.
pub fn make_streamable_http_service<H>(
    factory: impl Fn() -> H + Send + Sync + 'static,
    session_mgr: Arc<LocalSessionManager>,
    stateful: bool,
) -> StreamableHttpService<H, LocalSessionManager>
where
    H: ServerHandler,
{
    let cfg = StreamableHttpServerConfig { stateful_mode: stateful, ..Default::default() };
    tracing::debug!(stateful_mode = %cfg.stateful_mode, keep_alive = ?cfg.sse_keep_alive, "StreamableHttpServerConfig");
    let service_factory = move || {
        tracing::trace!("binding MCP service instance");
        Ok(factory())
    };
    StreamableHttpService::new(service_factory, session_mgr, cfg)
}
