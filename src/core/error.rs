use thiserror::Error;

/// Gateway-wide error model for startup, configuration and engine failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0} environment variable is required")]
    MissingCredential(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("{0}")]
    Message(String),
}

/// Failures of a single outbound answer-engine call.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Status: {status}, Data: {body}")]
    Status { status: u16, body: String },
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}
