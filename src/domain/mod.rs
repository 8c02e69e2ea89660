use std::{future::Future, pin::Pin, sync::Arc};

use rmcp::model::JsonObject;
use thiserror::Error;

use crate::core::content::Reply;
use crate::core::error::GatewayError;

pub const QUERY_TOOL_NAME: &str = "query_perplexity";

/// Why an incoming `tools/call` was rejected before reaching the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidCall {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments: \"prompt\" (string) is required.")]
    InvalidArguments,
}

/// A validated `query_perplexity` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    prompt: String,
}

impl QueryRequest {
    /// Name is checked first, then the argument object.
    pub fn from_call(name: &str, arguments: Option<&JsonObject>) -> Result<Self, InvalidCall> {
        if name != QUERY_TOOL_NAME {
            return Err(InvalidCall::UnknownTool(name.to_owned()));
        }
        let prompt = arguments
            .and_then(|args| args.get("prompt"))
            .and_then(|v| v.as_str())
            .ok_or(InvalidCall::InvalidArguments)?;
        Ok(Self {
            prompt: prompt.to_owned(),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Anything that can turn a prompt into a [`Reply`].
///
/// Documented remote failures come back as `Ok(Reply::Failure(..))`; `Err` is
/// reserved for faults the engine could not describe itself.
#[async_trait::async_trait]
pub trait AnswerEngine: Send + Sync + 'static {
    async fn ask(&self, prompt: &str) -> Result<Reply, GatewayError>;
}

type EngineFuture = Pin<Box<dyn Future<Output = Result<Reply, GatewayError>> + Send>>;

/// Adapts a plain async closure into an [`AnswerEngine`].
pub struct FnEngine {
    inner: Arc<dyn Fn(String) -> EngineFuture + Send + Sync>,
}

impl FnEngine {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, GatewayError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |s| Box::pin(f(s))),
        }
    }
}

#[async_trait::async_trait]
impl AnswerEngine for FnEngine {
    async fn ask(&self, prompt: &str) -> Result<Reply, GatewayError> {
        (self.inner)(prompt.to_owned()).await
    }
}
