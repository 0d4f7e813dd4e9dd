//! Tool protocol definitions.
//!
//! Tools are the surface the MCP server exposes to LLM clients.

mod traits;
mod definition;
mod context;
mod result;

pub use traits::*;
pub use definition::*;
pub use context::*;
pub use result::*;
