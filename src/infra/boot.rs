use std::net::SocketAddr;

use crate::infra::config::{Config, Mode, PerplexityConfig};
use crate::infra::runtime::mcp_transport;
use crate::tools::query_perplexity::PerplexitySvc;

/// Read configuration, build the handler, then hand it to the selected transport.
/// Configuration errors surface before any transport is opened.
pub async fn run_server() -> anyhow::Result<()> {
    let pplx = PerplexityConfig::from_env()?;
    let cfg = Config::from_env()?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        base_url = %pplx.base_url,
        "BOOT perplexity-mcp"
    );

    let svc = PerplexitySvc::from_config(&pplx)?;

    match cfg.mode {
        Mode::Stdio => {
            mcp_transport::serve_stdio(svc, mcp_transport::ctrl_c())
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Mode::Server => {
            let app = crate::infra::http_app::build_app(svc);
            let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "Perplexity MCP server listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(mcp_transport::ctrl_c())
                .await?;
        }
    }
    Ok(())
}
