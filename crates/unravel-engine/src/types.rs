//! Request and response types for a deobfuscation run.

use serde::{Deserialize, Serialize};

/// An obfuscation technique the detector can report.
///
/// Variants are declared in pipeline order: transforms run in this order when
/// their technique is detected, and the detected list is reported in this
/// order too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    InvisibleUnicode,
    StringEncoding,
    VmProtection,
    ControlFlowFlattening,
    StringArrayRotation,
    DeadCodeInjection,
    OpaquePredicates,
    AstOptimized,
}

impl Technique {
    /// Techniques the detector can find, in pipeline order.
    pub const DETECTABLE: [Technique; 7] = [
        Technique::InvisibleUnicode,
        Technique::StringEncoding,
        Technique::VmProtection,
        Technique::ControlFlowFlattening,
        Technique::StringArrayRotation,
        Technique::DeadCodeInjection,
        Technique::OpaquePredicates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Technique::InvisibleUnicode => "invisible-unicode",
            Technique::StringEncoding => "string-encoding",
            Technique::VmProtection => "vm-protection",
            Technique::ControlFlowFlattening => "control-flow-flattening",
            Technique::StringArrayRotation => "string-array-rotation",
            Technique::DeadCodeInjection => "dead-code-injection",
            Technique::OpaquePredicates => "opaque-predicates",
            Technique::AstOptimized => "ast-optimized",
        }
    }

    /// Techniques whose rewrite is reliable enough to earn a confidence
    /// bonus on top of the per-technique credit.
    pub fn is_high_confidence(&self) -> bool {
        matches!(
            self,
            Technique::InvisibleUnicode
                | Technique::StringArrayRotation
                | Technique::DeadCodeInjection
                | Technique::OpaquePredicates
                | Technique::StringEncoding
                | Technique::AstOptimized
        )
    }
}

impl std::fmt::Display for Technique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input of a deobfuscation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeobfuscateRequest {
    pub code: String,

    #[serde(default)]
    pub detect_only: bool,

    #[serde(default, rename = "aggressiveVM", alias = "aggressiveVm")]
    pub aggressive_vm: bool,

    /// Falls back to the engine default (on) when absent.
    #[serde(
        default,
        rename = "useASTOptimization",
        alias = "useAstOptimization",
        skip_serializing_if = "Option::is_none"
    )]
    pub use_ast_optimization: Option<bool>,

    /// Overall time budget in milliseconds. Falls back to the engine default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl DeobfuscateRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detect_only: false,
            aggressive_vm: false,
            use_ast_optimization: None,
            timeout: None,
        }
    }

    pub fn detect_only(mut self) -> Self {
        self.detect_only = true;
        self
    }

    pub fn with_aggressive_vm(mut self, aggressive: bool) -> Self {
        self.aggressive_vm = aggressive;
        self
    }

    pub fn with_ast_optimization(mut self, enabled: bool) -> Self {
        self.use_ast_optimization = Some(enabled);
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }
}

/// VM protection details attached to a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmDetected {
    #[serde(rename = "type")]
    pub vm_type: String,
    pub instructions: usize,
    pub deobfuscated: bool,
}

/// Output of a deobfuscation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeobfuscateResponse {
    pub code: String,
    pub detected_techniques: Vec<Technique>,
    pub confidence: f64,
    pub warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast_optimized: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_detected: Option<VmDetected>,
}

impl DeobfuscateResponse {
    pub fn has_technique(&self, technique: Technique) -> bool {
        self.detected_techniques.contains(&technique)
    }
}
