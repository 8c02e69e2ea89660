use std::fmt;

use crate::core::error::GatewayError;

pub const API_KEY_VAR: &str = "PERPLEXITY_API_KEY";
pub const BASE_URL_VAR: &str = "PERPLEXITY_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Transport the gateway speaks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stdio,
    Server,
}

impl Mode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "stdio" => Some(Mode::Stdio),
            "server" => Some(Mode::Server),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Stdio => f.write_str("stdio"),
            Mode::Server => f.write_str("server"),
        }
    }
}

pub struct Config {
    pub mode: Mode,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, GatewayError> {
        let raw_mode = std::env::var("MODE").unwrap_or_else(|_| "stdio".into());
        let mode = Mode::parse(&raw_mode).ok_or_else(|| {
            GatewayError::Config(format!(
                "Invalid MODE: {raw_mode}. Must be 'stdio' or 'server'"
            ))
        })?;
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if mode == Mode::Server && port == 0 {
            return Err(GatewayError::Config("PORT cannot be 0".into()));
        }

        Ok(Self { mode, port })
    }
}

/// Bearer credential for the answer engine. Formatting never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***, len={})", self.0.len())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Everything needed to reach the remote answer engine.
#[derive(Debug, Clone)]
pub struct PerplexityConfig {
    pub api_key: ApiKey,
    pub base_url: String,
}

impl PerplexityConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(GatewayError::MissingCredential(API_KEY_VAR))?;
        let base_url = std::env::var(BASE_URL_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key: ApiKey::new(api_key),
            base_url,
        })
    }
}
