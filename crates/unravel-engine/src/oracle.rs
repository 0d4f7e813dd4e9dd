//! The oracle: an external LLM consulted for control-flow recovery and final
//! cleanup.
//!
//! The engine only sees the [`Oracle`] trait. [`ProviderOracle`] adapts any
//! [`LLMProvider`] to it; tests substitute a mock.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use unravel_protocols::{CompletionRequest, LLMProvider, Message};

use crate::error::OracleError;

/// Sampling options for a single oracle call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
}

impl ChatReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn chat(
        &self,
        messages: Vec<Message>,
        options: ChatOptions,
    ) -> Result<ChatReply, OracleError>;
}

/// Oracle backed by an LLM provider and a fixed model.
pub struct ProviderOracle {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ProviderOracle {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Oracle for ProviderOracle {
    async fn chat(
        &self,
        messages: Vec<Message>,
        options: ChatOptions,
    ) -> Result<ChatReply, OracleError> {
        let request = CompletionRequest::new(&self.model, messages)
            .with_temperature(options.temperature)
            .with_max_tokens(options.max_tokens);

        debug!(provider = self.provider.id(), model = %self.model, "Sending oracle request");
        let response = self.provider.complete(request).await?;
        if response.message.content.trim().is_empty() {
            return Err(OracleError::EmptyReply);
        }
        Ok(ChatReply::new(response.message.content))
    }
}

/// Pull the code out of an oracle reply.
///
/// Takes the body of the first fenced block when there is one, dropping the
/// language tag; otherwise the whole reply. Returns `None` for empty content.
pub fn extract_code(reply: &str) -> Option<String> {
    let code = match reply.find("```") {
        Some(open) => {
            let after_fence = &reply[open + 3..];
            let body = after_fence
                .find('\n')
                .map_or("", |newline| &after_fence[newline + 1..]);
            match body.find("```") {
                Some(close) => &body[..close],
                None => body,
            }
        }
        None => reply,
    };
    let code = code.trim();
    (!code.is_empty()).then(|| code.to_string())
}

/// Split `source` after at most `limit` characters, on a char boundary.
pub(crate) fn split_snippet(source: &str, limit: usize) -> (&str, &str) {
    match source.char_indices().nth(limit) {
        Some((index, _)) => source.split_at(index),
        None => (source, ""),
    }
}

#[cfg(test)]
#[path = "oracle_tests.rs"]
mod tests;
