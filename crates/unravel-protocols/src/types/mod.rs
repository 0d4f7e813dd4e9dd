//! Common types used across the unravel workspace.

mod message;
mod common;

pub use message::*;
pub use common::*;
