//! Tool result content: what a single invocation hands back to the client.

use rmcp::model::{CallToolResult, Content};

/// Outcome of one answer-engine query. Both arms travel as a single text item;
/// only `Failure` raises the error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    Failure(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Answer(s) | Reply::Failure(s) => s,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failure(_))
    }
}

impl From<Reply> for CallToolResult {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Answer(text) => CallToolResult::success(vec![Content::text(text)]),
            Reply::Failure(text) => CallToolResult::error(vec![Content::text(text)]),
        }
    }
}
