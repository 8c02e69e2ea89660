use axum::{
    routing::{any_service, get},
    Router,
};
use std::sync::Arc;

use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};
use crate::tools::query_perplexity::PerplexitySvc;

/// `/healthz` + streamable MCP at `/mcp`. Every session gets a clone of `svc`.
pub fn build_app(svc: PerplexitySvc) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = make_streamable_http_service(move || svc.clone(), session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}
