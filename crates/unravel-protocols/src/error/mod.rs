//! Error types for the unravel protocol layer.

mod provider;
mod tool;

pub use provider::*;
pub use tool::*;
