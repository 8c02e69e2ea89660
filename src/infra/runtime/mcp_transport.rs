//! Generic MCP transport helpers (stdio + streamable HTTP) decoupled from tool logic.

use std::future::Future;
use std::sync::Arc;

use rmcp::serve_server;
use rmcp::service::QuitReason;
use rmcp::transport::streamable_http_server::tower::{StreamableHttpServerConfig, StreamableHttpService};

pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
pub use rmcp::ServerHandler;

/// Serve `handler` over stdin/stdout until the client hangs up or `shutdown`
/// resolves. `shutdown` is polled from the start, so it also covers the
/// initialize handshake. On shutdown the service is cancelled, which closes
/// the transport.
///
/// The stdin reader may stay parked on the blocking pool afterwards; the
/// runtime must be shut down without waiting for it.
pub async fn serve_stdio<H>(
    handler: H,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<QuitReason, Box<dyn std::error::Error + Send + Sync>>
where
    H: ServerHandler,
{
    let mut shutdown = std::pin::pin!(shutdown);
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let running = tokio::select! {
        res = serve_server(handler, (stdin, stdout)) => res?,
        _ = &mut shutdown => {
            tracing::info!("shutdown requested during initialization");
            return Ok(QuitReason::Cancelled);
        }
    };
    tracing::info!("Perplexity MCP server running on stdio");

    let token = running.cancellation_token();
    let waiting = running.waiting();
    tokio::pin!(waiting);
    let reason = tokio::select! {
        res = &mut waiting => res?,
        _ = &mut shutdown => {
            tracing::info!("shutdown requested, closing stdio transport");
            token.cancel();
            waiting.await?
        }
    };
    tracing::info!(reason = ?reason, "stdio service stopped");
    Ok(reason)
}

pub fn make_streamable_http_service<H>(
    factory: impl Fn() -> H + Send + Sync + Clone + 'static,
    session_mgr: Arc<LocalSessionManager>,
) -> StreamableHttpService<H, LocalSessionManager>
where
    H: ServerHandler,
{
    let cfg = StreamableHttpServerConfig::default();
    tracing::debug!(stateful_mode = %cfg.stateful_mode, keep_alive = ?cfg.sse_keep_alive, "StreamableHttpServerConfig");
    let service_factory = move || Ok(factory());
    StreamableHttpService::new(service_factory, session_mgr, cfg)
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed the future
/// never resolves, leaving the transport's own end-of-stream as the exit path.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
