use std::time::Instant;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::content::Reply;
use crate::core::error::{GatewayError, QueryError};
use crate::domain::AnswerEngine;
use crate::infra::config::{ApiKey, PerplexityConfig};
use crate::infra::http::client::make_http_client;
use crate::infra::http::headers::add_standard_headers;

pub const MODEL: &str = "sonar-reasoning";
pub const SYSTEM_PROMPT: &str = "Be precise and concise.";
pub const NO_RESPONSE: &str = "No response from Perplexity.";
pub const ERROR_PREFIX: &str = "Error querying Perplexity API.";

#[derive(Clone)]
pub struct PerplexityRemote {
    base: String,
    api_key: ApiKey,
    http: Client,
}

impl PerplexityRemote {
    pub fn new(base: impl Into<String>, api_key: ApiKey) -> Result<Self, GatewayError> {
        let http = make_http_client()?;
        Ok(Self {
            base: base.into(),
            api_key,
            http,
        })
    }

    pub fn from_config(cfg: &PerplexityConfig) -> Result<Self, GatewayError> {
        Self::new(cfg.base_url.clone(), cfg.api_key.clone())
    }

    /// Send one prompt and fold every documented failure into a diagnostic.
    pub async fn query(&self, prompt: &str) -> Reply {
        let start = Instant::now();
        match self.chat_completion(prompt).await {
            Ok(answer) => {
                let elapsed_ms = start.elapsed().as_millis() as f64;
                crate::infra::logging::log_metric("query_perplexity", "remote_latency_ms", elapsed_ms);
                Reply::Answer(answer)
            }
            Err(e) => {
                crate::infra::logging::log_metric("query_perplexity", "remote_error_total", 1.0);
                let diagnostic = format!("{ERROR_PREFIX} {e}");
                tracing::error!(error = %diagnostic, "perplexity query failed");
                Reply::Failure(diagnostic)
            }
        }
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String, QueryError> {
        let url = format!("{}/chat/completions", self.base.trim_end_matches('/'));
        let (builder, rid) = add_standard_headers(self.http.post(url.as_str()), None);
        tracing::debug!(endpoint = %url, request_id = %rid, prompt_len = prompt.len(), "perplexity.query request");

        let resp = builder
            .bearer_auth(self.api_key.expose())
            .json(&ChatRequest::new(prompt))
            .send()
            .await
            .map_err(QueryError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(QueryError::Status {
                status: status.as_u16(),
                body: error_body(resp.text().await),
            });
        }

        let body = resp.json::<JsonValue>().await.map_err(QueryError::Decode)?;
        tracing::trace!(request_id = %rid, "perplexity.query response decoded");
        Ok(extract_answer(&body))
    }
}

#[async_trait::async_trait]
impl AnswerEngine for PerplexityRemote {
    async fn ask(&self, prompt: &str) -> Result<Reply, GatewayError> {
        Ok(self.query(prompt).await)
    }
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'static str,
    messages: [ChatMessage<'a>; 2],
}

impl<'a> ChatRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            model: MODEL,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// `choices[0].message.content`, or the placeholder when it is absent, empty or not a string.
/// Later choices are never inspected.
fn extract_answer(body: &JsonValue) -> String {
    body.pointer("/choices/0/message/content")
        .and_then(JsonValue::as_str)
        .filter(|content| !content.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}

/// Body of a non-2xx response. A failed read is logged and folded into the text.
fn error_body(read: Result<String, reqwest::Error>) -> String {
    match read {
        Ok(raw) => render_body(&raw),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read error response body");
            JsonValue::String(format!("<unreadable body: {e}>")).to_string()
        }
    }
}

/// Error bodies are echoed as compact JSON; non-JSON text is quoted.
fn render_body(raw: &str) -> String {
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(v) => v.to_string(),
        Err(_) => JsonValue::String(raw.to_owned()).to_string(),
    }
}
