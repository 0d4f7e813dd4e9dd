//! OpenAI-compatible LLM provider for unravel.
//!
//! Any endpoint that speaks the chat completions wire format works here,
//! which is how the deobfuscation oracle reaches hosted and local models.

mod api;
mod converter;
mod provider;

pub use provider::OpenAIProvider;
