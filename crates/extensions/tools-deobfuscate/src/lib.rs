//! # Unravel Tools - Deobfuscate
//!
//! MCP tools wrapping the deobfuscation engine.

pub mod tools;

pub use tools::{DeobfuscateTool, DetectObfuscationTool, DetectionSummary};
