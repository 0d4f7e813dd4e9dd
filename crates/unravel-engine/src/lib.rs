//! # Unravel Engine
//!
//! Static JavaScript deobfuscation: detects known obfuscation techniques in a
//! source unit, applies a targeted rewrite for each, then runs a bounded
//! multi-pass AST optimizer and scores how far the result can be trusted.
//!
//! ## Stages
//!
//! - [`detector`] - text predicates over normalized source
//! - [`transforms`] - one rewrite per detected technique
//! - [`optimizer`] - bounded 8-pass structural simplifier
//! - [`complexity`] / [`confidence`] - diagnostics
//! - [`Deobfuscator`] - the orchestrator tying the stages together
//!
//! Several rewrites are deliberately unsound (constant propagation ignores
//! shadowing and reassignment, rotation removal is a structural heuristic).
//! This is a reverse-engineering aid, not a semantics-preserving compiler.

mod budget;
pub mod complexity;
pub mod confidence;
pub mod detector;
mod error;
mod flatten;
pub mod optimizer;
pub mod oracle;
mod pass;
mod pipeline;
pub mod syntax;
pub mod transforms;
mod types;
mod util;
pub mod vm;

pub use error::{EngineError, OracleError, ParseError, PrintError};
pub use oracle::{ChatOptions, ChatReply, Oracle, ProviderOracle};
pub use pass::TreePass;
pub use pipeline::{Deobfuscator, EngineOptions};
pub use types::{DeobfuscateRequest, DeobfuscateResponse, Technique, VmDetected};
pub use vm::{HeuristicVmAnalyzer, VmAnalyzer, VmDeobfuscation, VmProtectionInfo};
