//! Tool execution context.

use tokio_util::sync::CancellationToken;

/// Context for tool execution.
#[derive(Clone)]
pub struct ToolContext {
    /// Session ID for the current session.
    pub session_id: String,

    /// Correlation ID for tracing.
    pub correlation_id: String,

    /// Cancellation token shared with the caller.
    pub cancellation: CancellationToken,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Check if the operation should be aborted.
    pub fn is_aborted(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
