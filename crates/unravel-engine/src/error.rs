//! Engine error types.
//!
//! Only [`EngineError`] ever reaches a caller of the pipeline. Everything else
//! is caught at the stage that produced it and degrades to a no-op or a
//! warning.

use thiserror::Error;

use unravel_protocols::error::ProviderError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No code provided: `code` must be a non-empty string")]
    EmptyInput,
}

/// The source text is not valid in any supported dialect.
#[derive(Debug, Clone, Error)]
#[error("Parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Code generation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generated code is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Oracle call timed out after {0} ms")]
    Timeout(u64),

    #[error("Oracle call was cancelled")]
    Cancelled,

    #[error("Oracle returned no usable content")]
    EmptyReply,
}
