pub mod config;
pub mod http_app;
pub mod logging;
pub mod http {
    pub mod client;
    pub mod headers;
}
pub mod boot;
pub mod runtime {
    pub mod mcp_transport;
}
