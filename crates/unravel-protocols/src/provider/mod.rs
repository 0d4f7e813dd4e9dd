//! LLM Provider protocol definitions.
//!
//! Providers connect to LLM APIs and provide completion capabilities.
//! The deobfuscation engine only ever consumes them through its oracle seam.

mod traits;
mod request;
mod response;

pub use traits::*;
pub use request::*;
pub use response::*;
