//! Tool execution errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Parameter validation failed: {0}")]
    ValidationFailed(String),

    #[error("Tool execution timed out after {0} ms")]
    Timeout(u64),

    #[error("Tool execution was cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_not_found() {
        let err = ToolError::NotFound("deobfuscate".to_string());
        assert!(err.to_string().contains("Tool not found"));
        assert!(err.to_string().contains("deobfuscate"));
    }

    #[test]
    fn test_tool_error_execution_failed() {
        let err = ToolError::ExecutionFailed("Something went wrong".to_string());
        assert!(err.to_string().contains("execution failed"));
    }

    #[test]
    fn test_tool_error_invalid_parameters() {
        let err = ToolError::InvalidParameters("code must not be empty".to_string());
        assert!(err.to_string().contains("Invalid parameters"));
        assert!(err.to_string().contains("code must not be empty"));
    }

    #[test]
    fn test_tool_error_timeout() {
        let err = ToolError::Timeout(60000);
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("60000"));
    }

    #[test]
    fn test_tool_error_cancelled() {
        let err = ToolError::Cancelled;
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_tool_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ToolError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }
}
